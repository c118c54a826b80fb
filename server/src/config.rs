//! Server configuration and its command-line overrides.
//!
//! Argument parsing is hand-rolled rather than pulled from a crate: the
//! core this binary wraps treats CLI parsing as an external collaborator
//! (see `--ip --port --fs --workers` in the external interfaces), and no
//! CLI crate is otherwise part of this workspace's dependency stack.

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
    pub use_fs: bool,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 7878,
            use_fs: false,
            workers: None,
        }
    }
}

impl ServerConfig {
    /// Parses `--ip <host> --port <port> [--fs] [--workers N]`. Unknown
    /// flags and missing values are reported as errors rather than
    /// silently ignored.
    pub fn from_args(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut cfg = Self::default();
        let mut args = args.peekable();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--ip" => {
                    cfg.ip = args.next().ok_or("--ip requires a value")?;
                }
                "--port" => {
                    let value = args.next().ok_or("--port requires a value")?;
                    cfg.port = value
                        .parse()
                        .map_err(|_| format!("invalid --port value: {value}"))?;
                }
                "--fs" => cfg.use_fs = true,
                "--workers" => {
                    let value = args.next().ok_or("--workers requires a value")?;
                    let workers: usize = value
                        .parse()
                        .map_err(|_| format!("invalid --workers value: {value}"))?;
                    if workers == 0 {
                        return Err("--workers must be at least 1".to_string());
                    }
                    cfg.workers = Some(workers);
                }
                other => return Err(format!("unknown flag: {other}")),
            }
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> impl Iterator<Item = String> {
        parts.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn defaults_without_args() {
        let cfg = ServerConfig::from_args(args(&[])).unwrap();
        assert_eq!(cfg.ip, "127.0.0.1");
        assert_eq!(cfg.port, 7878);
        assert!(!cfg.use_fs);
        assert_eq!(cfg.workers, None);
    }

    #[test]
    fn parses_all_flags() {
        let cfg = ServerConfig::from_args(args(&[
            "--ip", "0.0.0.0", "--port", "9000", "--fs", "--workers", "4",
        ]))
        .unwrap();
        assert_eq!(cfg.ip, "0.0.0.0");
        assert_eq!(cfg.port, 9000);
        assert!(cfg.use_fs);
        assert_eq!(cfg.workers, Some(4));
    }

    #[test]
    fn rejects_unknown_flag() {
        assert!(ServerConfig::from_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn rejects_zero_workers() {
        assert!(ServerConfig::from_args(args(&["--workers", "0"])).is_err());
    }
}
