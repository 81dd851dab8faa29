use std::sync::Arc;
use std::time::Duration;

use dragon_config::loader::FileLoader;
use dragon_config::source::{EnvSource, YamlSource};
use dragon_config::{BoxError, Configurable, Fields, Manager, Source, Validate};

#[derive(Debug, Default)]
struct AppConfig {
    app: AppSection,
    database: DatabaseSection,
}

impl Configurable for AppConfig {
    fn fields<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields
            .nested("app", &mut self.app)
            .nested("database", &mut self.database);
    }
}

#[derive(Debug, Default)]
struct AppSection {
    name: String,
    debug: bool,
    hosts: Vec<String>,
}

impl Configurable for AppSection {
    fn fields<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields
            .field("name,required", &mut self.name)
            .field("debug", &mut self.debug)
            .field("hosts", &mut self.hosts);
    }
}

#[derive(Debug, Default)]
struct DatabaseSection {
    dsn: String,
    password: String,
    pool_size: u16,
    timeout: Duration,
}

impl Configurable for DatabaseSection {
    fn fields<'a>(&'a mut self, fields: &mut Fields<'a>) {
        fields
            .field("dsn,required", &mut self.dsn)
            .field("password,secret", &mut self.password)
            .field("pool_size", &mut self.pool_size)
            .field("timeout", &mut self.timeout);
    }

    fn validator(&self) -> Option<&dyn Validate> {
        Some(self)
    }
}

impl Validate for DatabaseSection {
    fn validate(&self) -> Result<(), BoxError> {
        if self.pool_size == 0 {
            return Err("database.pool_size must be positive".into());
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Environment wins over the file: DRAGON_DATABASE_TIMEOUT=30s overrides `timeout`.
    let env = Arc::new(EnvSource::new().with_prefix("dragon_"));
    let file = Arc::new(YamlSource::new(FileLoader::new("demos/config.yaml")));
    file.load()?;

    let mut manager = Manager::new();
    manager.add_plain_source(env.clone());
    manager.add_plain_source(file);
    // Secrets only ever come from the environment (DRAGON_DATABASE_PASSWORD).
    manager.add_secret_source(env);

    let mut config = AppConfig::default();
    manager.populate(&mut config)?;

    println!("App: {} (debug={})", config.app.name, config.app.debug);
    println!("Hosts: {}", config.app.hosts.join(", "));
    println!(
        "Database: {} (pool={}, timeout={:?}, password set={})",
        config.database.dsn,
        config.database.pool_size,
        config.database.timeout,
        !config.database.password.is_empty()
    );

    Ok(())
}
