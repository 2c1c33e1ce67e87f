//! Hard-coded pipeline values: images, credentials, paths, and cache names.

/// Database service image.
pub const DB_IMAGE: &str = "postgres:15-alpine";
/// Database superuser name.
pub const DB_USER: &str = "postgres";
/// Database superuser password.
pub const DB_PASSWORD: &str = "postgres";
/// Port exposed by the database service.
pub const DB_PORT: u16 = 5432;
/// Hostname the database service is bound under inside the app container.
pub const DB_ALIAS: &str = "db";

/// Repository of the application base image.
pub const APP_IMAGE_REPOSITORY: &str = "hexpm/elixir";
/// Elixir version used when no toolchain file pins one.
pub const DEFAULT_ELIXIR_VERSION: &str = "1.15.2";
/// Erlang/OTP version used when no toolchain file pins one.
pub const DEFAULT_ERLANG_VERSION: &str = "26.0.2";
/// Debian release suffix of the application base image.
pub const DEBIAN_RELEASE: &str = "bookworm-20230612-slim";

/// Working directory and source mount point inside the app container.
pub const APP_WORKDIR: &str = "/app";
/// Host directory mounted as the application source tree.
pub const DEFAULT_SOURCE_DIR: &str = "app";
/// Paths excluded from the source mount.
pub const SOURCE_EXCLUDES: &[&str] = &["app/priv/", "ci/", "web"];

/// Cache volume holding fetched dependencies.
pub const DEPS_CACHE: &str = "deps";
/// Mount point of the dependency cache.
pub const DEPS_CACHE_PATH: &str = "/app/deps";
/// Cache volume holding compiled build artifacts.
pub const BUILD_CACHE: &str = "build";
/// Mount point of the build cache.
pub const BUILD_CACHE_PATH: &str = "/app/_build";

/// Environment variable naming the database host for the app.
pub const DB_HOST_VAR: &str = "DB_HOST";
/// Mix environment variable.
pub const MIX_ENV_VAR: &str = "MIX_ENV";
/// Mix environment the tests run in.
pub const MIX_ENV_TEST: &str = "test";

/// Toolchain manifest read for Elixir/Erlang versions.
pub const TOOLCHAIN_FILE: &str = ".mise.toml";

/// Container runtimes the engine can provision itself on.
pub const CONTAINER_RUNTIMES: &[&str] = &["docker", "podman", "nerdctl"];
/// Set when the engine runs somewhere a local runtime is not needed.
pub const RUNNER_HOST_VAR: &str = "_EXPERIMENTAL_DAGGER_RUNNER_HOST";
