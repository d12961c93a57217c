use hashbrown::HashMap;
use std::fmt;

#[derive(Debug)]
pub struct EnvVar(pub HashMap<String, String>);
impl std::ops::Deref for EnvVar {
    type Target = HashMap<String, String>;
    fn deref(&self) -> &HashMap<String, String> {
        &self.0
    }
}

impl Clone for EnvVar {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
impl EnvVar {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self(vars)
    }
}
impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = String::new();
        for env_var in &[
            "ENV",
            "RUST_ENV",
            "RUST_LOG",
            "BIND",
            "PORT",
            "JETSTREAM_URL",
            "WANTED_COLLECTIONS",
            "UPSTREAM_RECONNECT_DELAY",
            "UPSTREAM_PING_INTERVAL",
            "UPSTREAM_STALE_TIMEOUT",
            "RELAY_URL",
            "BASE_SPEED",
            "DISCARD_FRACTION",
            "SPECIAL_CHANCE",
            "MAX_RECONNECT_ATTEMPTS",
        ] {
            if let Some(value) = self.get(*env_var) {
                result = format!("{}\n    {}: {}", result, env_var, value)
            }
        }
        write!(f, "{}", result)
    }
}

#[macro_export]
macro_rules! from_env_var {
    ($(#[$outer:meta])*
     let name = $name:ident;
     let default: $type:ty = $inner:expr;
     let (env_var, allowed_values) = ($env_var:tt, $allowed_values:expr);
     let from_str = |$arg:ident| $body:expr;
    ) => {
        $(#[$outer])*
        #[derive(Clone)]
        pub struct $name(pub $type);
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{:?}", self.0)
            }
        }
        impl std::ops::Deref for $name {
            type Target = $type;
            fn deref(&self) -> &$type {
                &self.0
            }
        }
        impl std::default::Default for $name {
            fn default() -> Self {
                $name($inner)
            }
        }
        impl $name {
            fn inner_from_str($arg: &str) -> Option<$type> {
                $body
            }
            pub fn maybe_update(
                self,
                var: Option<&String>,
            ) -> Result<Self, $crate::err::FatalErr> {
                Ok(match var {
                    Some(empty_string) if empty_string.is_empty() => Self::default(),
                    Some(value) => Self(Self::inner_from_str(value).ok_or_else(|| {
                        $crate::err::FatalErr::config($env_var, value, $allowed_values)
                    })?),
                    None => self,
                })
            }
        }
    };
}
