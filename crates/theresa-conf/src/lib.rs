//! Configuration for the theresa server.
//!
//! Settings come from the process environment only:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `PORT` | listen port | `5173` |
//! | `NODE_ENV` | `production` selects the precompiled render path | development |
//! | `THERESA_ROOT` | project root holding `index.html` and `dist/client` | current directory |
//! | `THERESA_CATALOG` | JSON movie catalog fixture | built-in sample |
//! | `THERESA_CLIENT_DEV` | client build served in development | `$THERESA_ROOT/pkg` |
//!
//! ```no_run
//! use theresa_conf::Settings;
//!
//! let settings = Settings::from_env().unwrap();
//! println!("listening on {}", settings.bind_addr());
//! ```

pub mod settings;

pub use settings::env::{Env, EnvError, validate_env_var_name};
pub use settings::{RunMode, Settings};
