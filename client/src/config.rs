//! Client configuration and its command-line overrides.

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: 7878,
        }
    }
}

impl ClientConfig {
    /// Parses `--ip <host> --port <port>`.
    pub fn from_args(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut cfg = Self::default();
        let mut args = args.into_iter();

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
                other => return Err(format!("unknown flag: {other}")),
            }
        }

        Ok(cfg)
    }
}
