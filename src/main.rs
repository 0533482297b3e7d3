//! Terminal presentation layer for the chat demo. All state changes route
//! through the library; this file only parses commands and prints results.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use chatbot_demo::models::Conversation;
use chatbot_demo::store::{FileStore, KeyValueStore, MemoryStore};
use chatbot_demo::{AppError, ChatApp};

fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATBOT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatbot-demo")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatbot_demo=info".into()),
        )
        .init();

    let store: Arc<dyn KeyValueStore> = if std::env::args().any(|arg| arg == "--ephemeral") {
        info!("Running ephemeral: nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        let dir = data_dir();
        info!("Using data directory {}", dir.display());
        Arc::new(FileStore::new(dir))
    };
    let app = ChatApp::init(store).await;

    match app.current_user().await {
        Some(user) => println!("Welcome back, {}!", user.name),
        None => println!("Not signed in. Try: /login demo@chatbot.com demo123"),
    }
    println!("Type /help for commands; anything else is sent as a chat message.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            print_prompt();
            continue;
        }
        if line == "/quit" {
            break;
        }
        if let Err(e) = handle_line(&app, &line).await {
            println!("error: {e}");
        }
        print_prompt();
    }
    Ok(())
}

fn print_prompt() {
    print!("> ");
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

async fn handle_line(app: &ChatApp, line: &str) -> Result<(), AppError> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("/help") => {
            println!("/login <email> <password>   /register <email> <password> [name]");
            println!("/logout  /list  /open <n>  /new  /delete");
            println!("/export  /export-all  /settings  /reset-settings  /quit");
        }
        Some("/login") => {
            let email = parts.next().unwrap_or("");
            let password = parts.next().unwrap_or("");
            let user = app.login(email, password).await?;
            println!("Signed in as {}", user.name);
            if user.is_admin() {
                println!("Admin features enabled.");
            }
        }
        Some("/register") => {
            let email = parts.next().unwrap_or("");
            let password = parts.next().unwrap_or("");
            let name = parts.collect::<Vec<_>>().join(" ");
            let user = app.register(email, password, &name).await?;
            println!("Account created for {}", user.name);
        }
        Some("/logout") => {
            app.logout().await;
            println!("Signed out.");
        }
        Some("/list") => {
            let conversations = app.list_conversations().await?;
            if conversations.is_empty() {
                println!("No conversations yet. Start a new chat!");
            }
            for (i, c) in conversations.iter().enumerate() {
                println!(
                    "{:>2}. {}  [{} message(s)]  {}",
                    i + 1,
                    c.title,
                    c.messages.len(),
                    c.last_message_preview()
                );
            }
        }
        Some("/open") => {
            let index: usize = parts
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0);
            let conversations = app.list_conversations().await?;
            let picked = index
                .checked_sub(1)
                .and_then(|i| conversations.get(i))
                .ok_or_else(|| AppError::not_found(format!("#{index}")))?;
            let conversation = app.open_conversation(&picked.id).await?;
            render_conversation(&conversation);
        }
        Some("/new") => {
            app.start_new_chat().await;
            println!("New conversation. Say something!");
        }
        Some("/delete") => {
            app.delete_current_conversation().await?;
            println!("Conversation deleted.");
        }
        Some("/export") => {
            let doc = app.export_current_chat().await?;
            write_export(&doc.filename, &doc.to_pretty_json()).await;
        }
        Some("/export-all") => {
            let doc = app.export_all_data().await?;
            write_export(&doc.filename, &doc.to_pretty_json()).await;
        }
        Some("/settings") => {
            println!("{:#?}", app.settings().await);
        }
        Some("/reset-settings") => {
            app.reset_settings().await;
            println!("Settings reset to default.");
        }
        Some(cmd) if cmd.starts_with('/') => {
            println!("Unknown command {cmd}; try /help");
        }
        _ => {
            let response = app.send(line).await?;
            println!("assistant: {}", response.reply.content);
        }
    }
    Ok(())
}

fn render_conversation(conversation: &Conversation) {
    println!("── {} ──", conversation.title);
    for message in &conversation.messages {
        println!(
            "{}: {}",
            match message.role {
                chatbot_demo::models::MessageRole::User => "you",
                chatbot_demo::models::MessageRole::Assistant => "assistant",
            },
            message.content
        );
    }
}

async fn write_export(filename: &str, body: &str) {
    match tokio::fs::write(filename, body).await {
        Ok(()) => println!("Exported to {filename}"),
        Err(e) => println!("Could not write {filename}: {e}"),
    }
}
