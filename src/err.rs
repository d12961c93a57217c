use std::fmt;

pub enum FatalErr {
    Logger(log::SetLoggerError),
    Bind(warp::Error),
    Client(crate::client::ClientErr),
    // config errs
    Dotenv(dotenv::Error),
    ConfigErr(String),
}

impl FatalErr {
    pub fn config(
        var: impl fmt::Display,
        value: impl fmt::Display,
        allowed_vals: impl fmt::Display,
    ) -> Self {
        Self::ConfigErr(format!(
            "{0} is set to `{1}`, which is invalid.\n{3:7}{0} must be {2}.",
            var, value, allowed_vals, ""
        ))
    }
}

impl std::error::Error for FatalErr {}
impl fmt::Debug for FatalErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl fmt::Display for FatalErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use FatalErr::*;
        write!(
            f,
            "{}",
            match self {
                Logger(e) => format!("{}", e),
                Bind(e) => format!("could not bind the relay address.\n{:7}{}", "", e),
                Client(e) => format!("could not start the relay connection.\n{:7}{}", "", e),
                Dotenv(e) => format!("could not read the `.env` file.\n{:7}{}", "", e),
                ConfigErr(e) => e.to_string(),
            }
        )
    }
}

impl From<dotenv::Error> for FatalErr {
    fn from(e: dotenv::Error) -> Self {
        Self::Dotenv(e)
    }
}
impl From<warp::Error> for FatalErr {
    fn from(e: warp::Error) -> Self {
        Self::Bind(e)
    }
}
impl From<crate::client::ClientErr> for FatalErr {
    fn from(e: crate::client::ClientErr) -> Self {
        Self::Client(e)
    }
}
impl From<log::SetLoggerError> for FatalErr {
    fn from(e: log::SetLoggerError) -> Self {
        Self::Logger(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_err_names_the_variable_and_allowed_values() {
        let err = FatalErr::config("PORT", "eighty", "a number between 0 and 65535");
        let msg = err.to_string();
        assert!(msg.starts_with("PORT is set to `eighty`, which is invalid."));
        assert!(msg.ends_with("PORT must be a number between 0 and 65535."));
    }

    #[test]
    fn client_errs_convert_with_context() {
        let err = FatalErr::from(crate::client::ClientErr::Config("bad".to_string()));
        assert!(err.to_string().starts_with("could not start the relay connection."));
    }
}
