use std::env;
use dotenvy::dotenv;
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_mutation_per_min: u32,
    pub rate_query_per_min: u32,

    // Whether one person may punch under several enrollments on the same day
    pub allow_multi_subject_per_day: bool,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            rate_mutation_per_min: env::var("RATE_MUTATION_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_query_per_min: env::var("RATE_QUERY_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            allow_multi_subject_per_day: env::var("ALLOW_MULTI_SUBJECT_PER_DAY")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }
}
