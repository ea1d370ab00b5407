use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use client_manager::config;
use client_manager::{db, logging, ClientFilter, ClientRow, ClientUpdate, Database, DeleteOutcome, NewClient};

#[derive(Parser, Debug)]
#[command(name = "client-manager", version, about = "Manage clients and their phone numbers")]
struct Cli {
    /// Overrides DATABASE_URL from the environment
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop and recreate the clients and phones tables
    Init,
    AddClient {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// Repeat for several phones
        #[arg(long = "phone")]
        phones: Vec<String>,
    },
    AddPhone {
        client_id: i32,
        phone: String,
    },
    UpdateClient {
        client_id: i32,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Replaces all existing phones when given
        #[arg(long = "phone")]
        phones: Vec<String>,
    },
    DeletePhone {
        client_id: i32,
        phone: String,
    },
    DeleteClient {
        client_id: i32,
    },
    Find(FindArgs),
    /// Reset the schema and run a short sample session
    Demo,
}

#[derive(Args, Debug)]
struct FindArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Print rows as a JSON array
    #[arg(long)]
    json: bool,
}

impl From<&FindArgs> for ClientFilter {
    fn from(args: &FindArgs) -> Self {
        ClientFilter {
            first_name: args.first_name.clone(),
            last_name: args.last_name.clone(),
            email: args.email.clone(),
            phone: args.phone.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::init(cli.database_url.clone())?;

    logging::init(&config.logging());

    let db = db::init(&config.database()).await?;
    run(&db, cli.command).await
}

async fn run(db: &Database, command: Command) -> Result<()> {
    match command {
        Command::Init => {
            db.initialize_schema().await?;
            println!("Schema initialized");
        }
        Command::AddClient {
            first_name,
            last_name,
            email,
            phones,
        } => {
            let client = NewClient::new(first_name, last_name, email).with_phones(phones);
            let id = db.add_client(&client).await?;
            println!("{id}");
        }
        Command::AddPhone { client_id, phone } => {
            db.add_phone(client_id, &phone).await?;
        }
        Command::UpdateClient {
            client_id,
            first_name,
            last_name,
            email,
            phones,
        } => {
            let update = ClientUpdate {
                first_name,
                last_name,
                email,
                phones: (!phones.is_empty()).then_some(phones),
            };
            db.update_client(client_id, &update).await?;
        }
        Command::DeletePhone { client_id, phone } => {
            let removed = db.delete_phone(client_id, &phone).await?;
            println!("Removed {removed} phone(s)");
        }
        Command::DeleteClient { client_id } => match db.delete_client(client_id).await? {
            DeleteOutcome::Deleted => println!("Client {client_id} deleted"),
            DeleteOutcome::NotFound => println!("Client {client_id} is not in the database"),
        },
        Command::Find(args) => {
            let rows = db.find_client(&ClientFilter::from(&args)).await?;
            print_rows(&rows, args.json)?;
        }
        Command::Demo => demo(db).await?,
    }

    Ok(())
}

fn print_rows(rows: &[ClientRow], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    for row in rows {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            row.id,
            row.first_name,
            row.last_name,
            row.email,
            row.phone.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

async fn demo(db: &Database) -> Result<()> {
    db.initialize_schema().await?;

    let terkin = db
        .add_client(
            &NewClient::new("Vasily", "Terkin", "terkin23@mail.ru")
                .with_phones(["+7 992 345 99 99", "+7 990 888 88 88"]),
        )
        .await?;
    let pervyi = db
        .add_client(
            &NewClient::new("Pyotr", "Pervyi", "pervyi456@mail.ru").with_phones(["+7 990 888 88 56"]),
        )
        .await?;

    db.add_phone(terkin, "+7 999 098 99 99").await?;

    db.update_client(
        pervyi,
        &ClientUpdate::default()
            .first_name("Oleg")
            .phones(["+7 999 999 99 99"]),
    )
    .await?;

    db.delete_client(pervyi).await?;

    let rows = db.find_client(&ClientFilter::new().first_name("Vasily")).await?;
    info!(rows = rows.len(), "demo finished");
    print_rows(&rows, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn add_client_collects_repeated_phones() {
        let cli = Cli::parse_from([
            "client-manager",
            "add-client",
            "--first-name",
            "Vasily",
            "--last-name",
            "Terkin",
            "--email",
            "terkin23@mail.ru",
            "--phone",
            "+7 992 345 99 99",
            "--phone",
            "+7 990 888 88 88",
        ]);

        match cli.command {
            Command::AddClient { phones, .. } => assert_eq!(phones.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn find_args_become_filter() {
        let cli = Cli::parse_from(["client-manager", "find", "--first-name", "Vasily", "--json"]);

        match cli.command {
            Command::Find(args) => {
                assert!(args.json);
                assert_eq!(
                    ClientFilter::from(&args),
                    ClientFilter::new().first_name("Vasily")
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn database_url_flag_is_global() {
        let cli = Cli::parse_from([
            "client-manager",
            "delete-client",
            "7",
            "--database-url",
            "postgres://localhost/clients_db",
        ]);

        assert_eq!(cli.database_url.as_deref(), Some("postgres://localhost/clients_db"));
        assert!(matches!(cli.command, Command::DeleteClient { client_id: 7 }));
    }
}
