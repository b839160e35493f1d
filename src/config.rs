use std::env;

pub struct Config {
    pub discord_token: String,
    pub command_prefix: char,
    pub database_path: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let discord_token = env::var("DISCORD_TOKEN").map_err(|_| "DISCORD_TOKEN must be set")?;

        let command_prefix = env::var("COMMAND_PREFIX")
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or('$');
        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "database.db".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Self {
            discord_token,
            command_prefix,
            database_path,
            log_dir,
        })
    }
}
