use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use super::Source;
use crate::duration::parse_duration;
use crate::ConfigError;

/// A source reading process environment variables.
///
/// Keys map to variable names by prepending the prefix, replacing `.` with `_`
/// and upper-casing: with prefix `"app_"`, `database.dsn` reads `APP_DATABASE_DSN`.
/// Slices are comma-separated lists.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix prepended to every key before the variable lookup.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
            .replace('.', "_")
            .to_uppercase()
    }

    fn lookup(&self, key: &str) -> Result<String, ConfigError> {
        match std::env::var(self.var_name(key)) {
            Ok(value) => Ok(value),
            Err(VarError::NotPresent) => Err(ConfigError::KeyNotFound(key.to_string())),
            Err(VarError::NotUnicode(raw)) => Err(ConfigError::invalid_value(
                key,
                raw.to_string_lossy(),
                "not valid unicode",
            )),
        }
    }

    fn parsed<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.lookup(key)?;
        value
            .parse()
            .map_err(|e| ConfigError::invalid_value(key, value.as_str(), e))
    }

    fn parsed_slice<T>(
        &self,
        key: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Vec<T>, ConfigError> {
        let value = self.lookup(key)?;
        if value.is_empty() {
            return Ok(Vec::new());
        }

        value
            .split(',')
            .enumerate()
            .map(|(i, element)| {
                parse(element.trim()).map_err(|reason| {
                    let reason = format!("element {i}: {reason}");
                    ConfigError::invalid_value(key, value.as_str(), reason)
                })
            })
            .collect()
    }
}

impl Source for EnvSource {
    fn load(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn unload(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.lookup(key)
    }

    fn get_string_slice(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        self.parsed_slice(key, |s| Ok(s.to_string()))
    }

    fn get_int(&self, key: &str) -> Result<isize, ConfigError> {
        self.parsed(key)
    }

    fn get_int_slice(&self, key: &str) -> Result<Vec<isize>, ConfigError> {
        self.parsed_slice(key, parse_number)
    }

    fn get_uint(&self, key: &str) -> Result<usize, ConfigError> {
        self.parsed(key)
    }

    fn get_uint_slice(&self, key: &str) -> Result<Vec<usize>, ConfigError> {
        self.parsed_slice(key, parse_number)
    }

    fn get_int64(&self, key: &str) -> Result<i64, ConfigError> {
        self.parsed(key)
    }

    fn get_int64_slice(&self, key: &str) -> Result<Vec<i64>, ConfigError> {
        self.parsed_slice(key, parse_number)
    }

    fn get_uint64(&self, key: &str) -> Result<u64, ConfigError> {
        self.parsed(key)
    }

    fn get_uint64_slice(&self, key: &str) -> Result<Vec<u64>, ConfigError> {
        self.parsed_slice(key, parse_number)
    }

    fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.lookup(key)?;
        parse_bool(&value)
            .map_err(|reason| ConfigError::invalid_value(key, value.as_str(), reason))
    }

    fn get_bool_slice(&self, key: &str) -> Result<Vec<bool>, ConfigError> {
        self.parsed_slice(key, parse_bool)
    }

    fn get_float(&self, key: &str) -> Result<f64, ConfigError> {
        self.parsed(key)
    }

    fn get_float_slice(&self, key: &str) -> Result<Vec<f64>, ConfigError> {
        self.parsed_slice(key, parse_number)
    }

    fn get_duration(&self, key: &str) -> Result<Duration, ConfigError> {
        let value = self.lookup(key)?;
        parse_duration(&value)
    }
}

fn parse_number<T>(s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    s.parse().map_err(|e: T::Err| e.to_string())
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(format!("'{s}' is not a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard(Vec<&'static str>);

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (name, value) in vars {
                std::env::set_var(name, value);
            }
            Self(vars.iter().map(|(name, _)| *name).collect())
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for name in &self.0 {
                std::env::remove_var(name);
            }
        }
    }

    #[test]
    fn test_var_name_mapping() {
        let source = EnvSource::new().with_prefix("app_");
        assert_eq!(source.var_name("database.dsn"), "APP_DATABASE_DSN");
        assert_eq!(EnvSource::new().var_name("port"), "PORT");
    }

    #[test]
    #[serial]
    fn test_scalar_reads() {
        let _guard = EnvGuard::set(&[
            ("DRAGONTEST_NAME", "svc"),
            ("DRAGONTEST_PORT", "8080"),
            ("DRAGONTEST_OFFSET", "-12"),
            ("DRAGONTEST_RATIO", "0.5"),
            ("DRAGONTEST_DEBUG", "T"),
            ("DRAGONTEST_TIMEOUT", "10s"),
        ]);
        let source = EnvSource::new().with_prefix("dragontest.");

        assert_eq!(source.get_string("name").unwrap(), "svc");
        assert_eq!(source.get_uint("port").unwrap(), 8080);
        assert_eq!(source.get_uint64("port").unwrap(), 8080);
        assert_eq!(source.get_int("offset").unwrap(), -12);
        assert_eq!(source.get_int64("offset").unwrap(), -12);
        assert_eq!(source.get_float("ratio").unwrap(), 0.5);
        assert!(source.get_bool("debug").unwrap());
        assert_eq!(
            source.get_duration("timeout").unwrap(),
            Duration::from_secs(10)
        );
    }

    #[test]
    #[serial]
    fn test_missing_variable_is_key_not_found() {
        let source = EnvSource::new().with_prefix("dragontest_missing_");

        assert!(matches!(
            source.get_string("nothing"),
            Err(ConfigError::KeyNotFound(key)) if key == "nothing"
        ));
        assert!(matches!(
            source.get_int_slice("nothing"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    #[serial]
    fn test_slice_reads() {
        let _guard = EnvGuard::set(&[
            ("DRAGONTEST_HOSTS", "a, b,c"),
            ("DRAGONTEST_PORTS", "1, 2 ,3"),
            ("DRAGONTEST_FLAGS", "true,0"),
            ("DRAGONTEST_EMPTY", ""),
        ]);
        let source = EnvSource::new().with_prefix("dragontest_");

        assert_eq!(
            source.get_string_slice("hosts").unwrap(),
            vec!["a", "b", "c"]
        );
        assert_eq!(source.get_int_slice("ports").unwrap(), vec![1, 2, 3]);
        assert_eq!(source.get_uint_slice("ports").unwrap(), vec![1, 2, 3]);
        assert_eq!(source.get_bool_slice("flags").unwrap(), vec![true, false]);
        assert!(source.get_float_slice("empty").unwrap().is_empty());
    }

    #[test]
    #[serial]
    fn test_parse_failures_are_invalid_value() {
        let _guard = EnvGuard::set(&[
            ("DRAGONTEST_PORT", "eighty"),
            ("DRAGONTEST_PORTS", "1,x"),
            ("DRAGONTEST_DEBUG", "yes"),
            ("DRAGONTEST_NEGATIVE", "-1"),
        ]);
        let source = EnvSource::new().with_prefix("dragontest_");

        assert!(matches!(
            source.get_int("port"),
            Err(ConfigError::InvalidValue { .. })
        ));
        match source.get_int_slice("ports") {
            Err(ConfigError::InvalidValue { reason, .. }) => {
                assert!(reason.starts_with("element 1"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            source.get_bool("debug"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            source.get_uint("negative"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    #[serial]
    #[cfg(unix)]
    fn test_non_unicode_value_is_invalid_not_missing() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("DRAGONTEST_RAW", OsStr::from_bytes(b"ab\xffcd"));
        let source = EnvSource::new().with_prefix("dragontest_");
        let result = source.get_string("raw");
        std::env::remove_var("DRAGONTEST_RAW");

        match result {
            Err(ConfigError::InvalidValue { key, reason, .. }) => {
                assert_eq!(key, "raw");
                assert_eq!(reason, "not valid unicode");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
