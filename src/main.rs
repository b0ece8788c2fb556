use anyhow::{anyhow, bail, Context};
use bestof_vote::core::selection::RANK_LABELS;
use bestof_vote::domain::ports::ConfigProvider;
use bestof_vote::utils::error::ErrorSeverity;
use bestof_vote::utils::{logger, validation::Validate};
use bestof_vote::{
    AddOutcome, BallotSubmitter, CatalogItem, CatalogSearchClient, Category, CliConfig, Command,
    FileSessionStore, SessionGate, VoteConfig, VoteError, VotingBooth, MAX_PICKS,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("🚀 Starting bestof-vote");
    tracing::debug!("📁 Loading configuration from: {}", cli.config);

    let config = match VoteConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = FileSessionStore::new(config.session_file());
    let gate = SessionGate::new(config.site_password(), store).with_ttl(config.session_ttl());

    if let Err(e) = run(cli.command, &config, &gate).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(
    command: Command,
    config: &VoteConfig,
    gate: &SessionGate<FileSessionStore>,
) -> bestof_vote::Result<()> {
    match command {
        Command::Login { password } => {
            gate.login(&password).await?;
            println!(
                "✅ Unlocked for {} hours",
                config.session_ttl().as_secs() / 3600
            );
        }
        Command::Logout => {
            gate.logout().await?;
            println!("👋 Session cleared");
        }
        Command::Search { category, query } => {
            require_session(gate).await?;
            let client = CatalogSearchClient::from_config(config)?;
            let items = client.search(category, &query).await;
            print_results(category, &items);
        }
        Command::Vote => {
            require_session(gate).await?;
            let client = CatalogSearchClient::from_config(config)?;
            let submitter = BallotSubmitter::from_config(config)?;
            let booth = VotingBooth::from_client(client, submitter);
            interactive(booth).await?;
        }
    }
    Ok(())
}

async fn require_session(gate: &SessionGate<FileSessionStore>) -> bestof_vote::Result<()> {
    if gate.resume().await? {
        Ok(())
    } else {
        eprintln!("🔒 No active session, run `bestof-vote login <password>` first");
        Err(VoteError::AuthError)
    }
}

#[derive(Debug, PartialEq)]
enum Action {
    Search(Category, String),
    Pick(Category, usize),
    Up(Category, usize),
    Down(Category, usize),
    Remove(Category, usize),
    Clear(Category),
    Name(String),
    List,
    Submit,
    Help,
    Quit,
}

fn parse_action(line: &str) -> anyhow::Result<Action> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or_else(|| anyhow!("empty command"))?;
    let rest: Vec<&str> = words.collect();

    let category = |rest: &[&str]| -> anyhow::Result<Category> {
        let raw = rest.first().ok_or_else(|| anyhow!("missing category (movie, tv or game)"))?;
        raw.parse::<Category>().map_err(|e| anyhow!(e))
    };
    let position = |rest: &[&str]| -> anyhow::Result<usize> {
        let raw = rest.get(1).ok_or_else(|| anyhow!("missing number"))?;
        let n: usize = raw.parse().with_context(|| format!("'{}' is not a number", raw))?;
        if n == 0 {
            bail!("numbers start at 1");
        }
        Ok(n - 1)
    };

    Ok(match verb {
        "search" | "s" => Action::Search(category(&rest)?, rest.get(1..).unwrap_or(&[]).join(" ")),
        "pick" | "p" => Action::Pick(category(&rest)?, position(&rest)?),
        "up" => Action::Up(category(&rest)?, position(&rest)?),
        "down" => Action::Down(category(&rest)?, position(&rest)?),
        "remove" | "rm" => Action::Remove(category(&rest)?, position(&rest)?),
        "clear" => Action::Clear(category(&rest)?),
        "name" => Action::Name(rest.join(" ")),
        "list" | "ls" => Action::List,
        "submit" => Action::Submit,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => bail!("unknown command '{}', type 'help'", other),
    })
}

async fn interactive(mut booth: VotingBooth) -> bestof_vote::Result<()> {
    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("💡 {}", booth.readiness().hint());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let action = match parse_action(&line) {
            Ok(action) => action,
            Err(e) => {
                println!("⚠️ {}", e);
                continue;
            }
        };

        match action {
            Action::Search(category, query) => {
                let items = booth.search(category, &query).await;
                if !query.trim().is_empty() {
                    print_results(category, items);
                }
            }
            Action::Pick(category, index) => match booth.pick(category, index) {
                Ok(AddOutcome::Added { rank }) => {
                    println!("✅ Added as {}", RANK_LABELS[rank - 1]);
                    print_ranked(category, booth.selections().get(category).items());
                }
                Ok(AddOutcome::Duplicate) => println!("ℹ️ Already in your {} picks", category),
                Ok(AddOutcome::Full) => {}
                Err(e) => println!("⚠️ {}", e.user_friendly_message()),
            },
            Action::Up(category, index) => print_ranked(category, booth.move_up(category, index)),
            Action::Down(category, index) => print_ranked(category, booth.move_down(category, index)),
            Action::Remove(category, index) => print_ranked(category, booth.remove(category, index)),
            Action::Clear(category) => print_ranked(category, booth.clear(category)),
            Action::Name(name) => booth.set_voter_name(name),
            Action::List => {
                for category in Category::ALL {
                    print_ranked(category, booth.selections().get(category).items());
                }
            }
            Action::Submit => match booth.submit().await {
                Ok(receipt) => {
                    println!("🎉 Ballot sent at {}", receipt.dispatched_at.format("%H:%M:%S"));
                    println!("   (the sheet does not confirm receipt; the form has been reset)");
                }
                Err(e) => println!("❌ {}", e.user_friendly_message()),
            },
            Action::Help => print_help(),
            Action::Quit => break,
        }
    }

    Ok(())
}

fn print_results(category: Category, items: &[CatalogItem]) {
    if items.is_empty() {
        println!("{}", category.empty_results_message());
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. {} ({})", i + 1, item.title, item.year);
    }
}

fn print_ranked(category: Category, items: &[CatalogItem]) {
    println!("── {} ──", category);
    if items.is_empty() {
        println!("   Search and select up to {} picks (optional)", MAX_PICKS);
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!("   {}  {} ({})", RANK_LABELS[i], item.title, item.year);
    }
    let remaining = MAX_PICKS - items.len();
    if remaining > 0 {
        println!(
            "   {} more slot{} available",
            remaining,
            if remaining > 1 { "s" } else { "" }
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  search <movie|tv|game> <query>   find 2025 titles");
    println!("  pick <category> <n>              add result n to your picks");
    println!("  up|down|remove <category> <rank> reorder or drop a pick");
    println!("  clear <category>                 drop all picks in a category");
    println!("  name <your name>                 set the voter name");
    println!("  list | submit | help | quit");
}
