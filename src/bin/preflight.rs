use operix_inventory::domain::RawTable;
use operix_inventory::infra::{observability, AppConfig};
use operix_inventory::storage::{InventoryStore, PostgresInventoryStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--apply-schema] [--seed-catalogs]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           DB_MAX_CONNECTIONS, RUST_LOG, LOG_FORMAT\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let apply_schema = args.iter().any(|a| a == "--apply-schema");
    let seed = args.iter().any(|a| a == "--seed-catalogs");

    let config = AppConfig::from_env()?;
    observability::init(config.log_format);

    println!("> Preflight:");
    println!("  PORT={}", config.port);
    println!("  DB_MAX_CONNECTIONS={}", config.db_max_connections);
    println!("  SSE_KEEP_ALIVE_SECS={}", config.keep_alive.as_secs());
    println!("  FRONTEND_BUILD_DIR={}", config.frontend_build_dir.display());
    println!(
        "  frontend build present: {}",
        config.frontend_build_dir.join("index.html").is_file()
    );

    let store = PostgresInventoryStore::connect(&config.database_url, config.db_max_connections).await?;
    store.ping().await?;
    println!("  Database: reachable");

    if apply_schema {
        store.ensure_schema().await?;
        println!("  Schema: applied");
    }
    if seed {
        store.seed_catalogs().await?;
        println!("  Catalogs: seeded");
    }

    for table in RawTable::ALL {
        match store.raw_table(table).await {
            Ok(rows) => println!("  {}: {} rows", table.table_name(), rows.len()),
            Err(e) => anyhow::bail!(
                "{} is not readable ({}). Run with --apply-schema to create it.",
                table.table_name(),
                e
            ),
        }
    }

    println!("> Preflight OK");
    Ok(())
}
