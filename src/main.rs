use rusqlite::Connection;

use std::error::Error;
use std::sync::{Arc, Mutex};

use rboard::colors;
use rboard::data::{self, DBConnection};
use rboard::templates;

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::var("RBOARD_DB").unwrap_or_else(|_| "rboard.db".to_string());
    let connection = Connection::open(db_path)?;

    data::create_tables(&connection)?;
    templates::helpers::seed_default_template(&connection)?;
    colors::helpers::seed_default_colors(&connection)?;

    let connection: DBConnection = Arc::new(Mutex::new(connection));

    let _ = rboard::rocket(connection).launch().await?;

    Ok(())
}
