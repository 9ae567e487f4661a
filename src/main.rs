use anyhow::Result;
use clap::Parser;

// Use library instead of local modules
use paralympics_iris::config::{Cli, Command};
use paralympics_iris::iris::{insert_irises, insert_user, load_iris_csv, User};
use paralympics_iris::paralympics::{insert_events, insert_regions, load_events_csv, load_regions_csv};
use paralympics_iris::{count_rows, logging, open_database};

fn main() -> Result<()> {
    logging::init(logging::DEFAULT_FILTER);
    let cli = Cli::parse();

    println!("🗄️  Paralympics + Iris data import");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let conn = open_database(&cli.db)?;
    println!("✓ Database ready: {}", cli.db.display());

    match cli.command {
        Command::Init => {}
        Command::ImportRegions { csv } => {
            let regions = load_regions_csv(&csv)?;
            println!("✓ Loaded {} regions from CSV", regions.len());
            let inserted = insert_regions(&conn, &regions)?;
            println!("✓ Inserted {} new regions ({} already present)", inserted, regions.len() - inserted);
        }
        Command::ImportEvents { csv } => {
            let events = load_events_csv(&csv)?;
            println!("✓ Loaded {} events from CSV", events.len());
            insert_events(&conn, &events)?;
        }
        Command::ImportIris { csv } => {
            let rows = load_iris_csv(&csv)?;
            println!("✓ Loaded {} iris rows from CSV", rows.len());
            insert_irises(&conn, &rows)?;
        }
        Command::CreateUser { email, password } => {
            let user = User::new(&email, &password)?;
            let id = insert_user(&conn, &user)?;
            println!("✓ Created user {} ({})", id, email);
        }
    }

    println!("\n🔍 Row counts");
    for table in ["region", "event", "iris", "user"] {
        println!("   {:<8} {}", table, count_rows(&conn, table)?);
    }

    Ok(())
}
