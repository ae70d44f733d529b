//! Command-line front end for the Chatas API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use chatas_client::{
    ClientConfig, FileSessionStore, ProfileForm, RegisterForm, Session, SessionState,
};

#[derive(Parser)]
#[command(name = "chatas")]
#[command(version)]
#[command(about = "Chatas messenger client")]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// API base URL, including the `/api` prefix
    #[arg(long, env = "CHATAS_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in as it
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "CHATAS_PASSWORD")]
        password: String,
        #[arg(long)]
        profile_image: Option<String>,
    },
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long, env = "CHATAS_PASSWORD")]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List all users
    Users,
    /// Change username, email, password or profile image
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Leave unset to keep the current password
        #[arg(long, env = "CHATAS_NEW_PASSWORD")]
        password: Option<String>,
        #[arg(long)]
        profile_image: Option<String>,
    },
    /// Open (or create) a conversation with another user
    Chat { username: String },
    /// List your conversations
    Conversations,
    /// Show a conversation and mark it read
    Messages { conversation: Uuid },
    /// Send a message
    Send { conversation: Uuid, content: String },
    /// Like or unlike a message
    Like { conversation: Uuid, message: Uuid },
    /// Delete a conversation and its messages
    Delete { conversation: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,chatas_client=info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    let mut session = Session::start(&config);

    run(&mut session, cli.command).await
}

async fn run(session: &mut Session<FileSessionStore>, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            email,
            username,
            password,
            profile_image,
        } => {
            let form = RegisterForm {
                email,
                username,
                password_repeat: password.clone(),
                password,
                profile_image: profile_image.unwrap_or_default(),
            };
            let user = session.register(&form).await?;
            println!("Registered and logged in as {}", user.username);
        }
        Commands::Login { username, password } => {
            let user = session.login(&username, &password).await?;
            println!("Logged in as {}", user.username);
        }
        Commands::Logout => {
            session.logout();
            println!("Logged out");
        }
        Commands::Whoami => match session.state() {
            SessionState::LoggedIn(user) => {
                println!("{} <{}> {}", user.username, user.email, user.id)
            }
            _ => println!("Not logged in"),
        },
        Commands::Users => {
            session.load_directory().await?;
            for user in session.directory().users() {
                println!("{}  {:<20} {}", user.id, user.username, user.email);
            }
        }
        Commands::Profile {
            username,
            email,
            password,
            profile_image,
        } => {
            let Some(current) = session.current_user() else {
                bail!("Not logged in");
            };
            let mut form = ProfileForm::for_user(current);
            if let Some(username) = username {
                form.username = username;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(password) = password {
                form.password_repeat = password.clone();
                form.password = password;
            }
            if let Some(image) = profile_image {
                form.profile_image = image;
            }
            let user = session.update_profile(&form).await?;
            println!("Profile saved for {}", user.username);
        }
        Commands::Chat { username } => {
            session.load_directory().await?;
            let recipient = session
                .directory()
                .users()
                .iter()
                .find(|u| u.username == username)
                .map(|u| u.id)
                .with_context(|| format!("no user named {username}"))?;
            let conversation_id = session.start_conversation(recipient).await?;
            println!("{conversation_id}");
        }
        Commands::Conversations => {
            session.load_directory().await?;
            let list = session.conversations().await?;
            for row in list.rows() {
                let marker = if row.has_unread_messages { "*" } else { " " };
                println!("{marker} {}  {}", row.conversation_id, row.other_username);
            }
        }
        Commands::Messages { conversation } => {
            session.load_directory().await?;
            let chat = session.open_chat(conversation).await?;
            for message in chat.messages() {
                let like = if message.liked { " ♥" } else { "" };
                println!(
                    "[{}] {}: {}{like}  ({})",
                    message.sent_at.format("%Y-%m-%d %H:%M"),
                    chat.sender(message, session.directory()),
                    message.content,
                    message.id,
                );
            }
        }
        Commands::Send {
            conversation,
            content,
        } => {
            let message = session.send_message(conversation, &content).await?;
            println!("Sent {}", message.id);
        }
        Commands::Like {
            conversation,
            message,
        } => {
            let chat = session.open_chat(conversation).await?;
            let target = chat
                .messages()
                .iter()
                .find(|m| m.id == message)
                .with_context(|| format!("message {message} is not in this conversation"))?;
            let liked = session.toggle_like(target).await?;
            println!("{}", if liked { "Liked" } else { "Like removed" });
        }
        Commands::Delete { conversation } => {
            session.delete_conversation(conversation).await?;
            println!("Conversation deleted");
        }
    }
    Ok(())
}
