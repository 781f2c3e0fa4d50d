use anyhow::{Context, Result};
use biginv::config::InvConfig;
use biginv::inventory::ItemSet;
use biginv::principal::PlayerId;
use biginv::store::PlayerStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut conf_file = "conf/biginv.yaml".to_string();
    let mut command: Vec<String> = Vec::new();

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "--h" | "--?" | "/?" => {
                println!("Usage: biginv_admin [--conf FILE] <list | show PLAYER_ID>");
                return Ok(());
            }
            "--conf" => {
                if i + 1 < args.len() {
                    i += 1;
                    conf_file = args[i].clone();
                } else {
                    return Err(anyhow::anyhow!("--conf requires a FILE argument"));
                }
            }
            other => command.push(other.to_string()),
        }
        i += 1;
    }

    let config = InvConfig::from_file(&conf_file)
        .with_context(|| format!("Cannot load config: {}", conf_file))?;
    let store = biginv::store::open(&config.store).context("Cannot open player store")?;

    match command.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["list"] => {
            let ids = store.list()?;
            for id in &ids {
                println!("{}", id);
            }
            tracing::info!("[admin] [list] {} stored players", ids.len());
        }
        ["show", id] => {
            let owner = PlayerId::new(*id);
            let doc = store.load(&owner)?;
            println!("player: {}", owner);
            if let Some(saved_at) = doc.saved_at {
                let when = chrono::DateTime::from_timestamp(saved_at, 0)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| saved_at.to_string());
                println!("saved at: {}", when);
            }
            print_set("active", doc.active.as_ref());
            print_set("backup", doc.backup.as_ref());
        }
        _ => {
            return Err(anyhow::anyhow!(
                "expected `list` or `show PLAYER_ID`, see --help"
            ));
        }
    }
    Ok(())
}

fn print_set(label: &str, set: Option<&ItemSet>) {
    let Some(set) = set else {
        println!("{}: (none)", label);
        return;
    };
    println!("{}: {} slots, {} items", label, set.len(), set.item_count());
    for (slot, item) in set.contents().iter().enumerate() {
        if let Some(item) = item {
            match &item.display_name {
                Some(name) => {
                    println!("  [{:>3}] {} x{} \"{}\"", slot, item.kind, item.amount, name)
                }
                None => println!("  [{:>3}] {} x{}", slot, item.kind, item.amount),
            }
        }
    }
}
