use clap::{Parser, Subcommand};
use uuid::Uuid;
use zendea_client::{
    FilterCriteria, NewPost, PostPatch, PostType, PriceUnit, SortKey, ZendeaClient,
};

#[derive(Parser, Debug)]
#[clap(name = "zendea", about = "Command-line client for the Zendea jobs and deals board")]
struct Cli {
    /// API endpoint to talk to.
    #[clap(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in.
    Register {
        #[clap(long)]
        email: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        password: String,
    },
    /// Sign in with an existing account.
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Drop the stored token.
    Logout,
    /// Show who the stored token belongs to.
    Me,
    /// Search posts with optional filters.
    Search {
        #[clap(long)]
        query: Option<String>,
        #[clap(long, value_parser = parse_category)]
        category: Option<PostType>,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        max_price: Option<f64>,
        #[clap(long, value_parser = parse_sort)]
        sort: Option<SortKey>,
    },
    /// Show a single post.
    GetPost { id: Uuid },
    /// Publish a new post.
    CreatePost {
        #[clap(long, value_parser = parse_category)]
        post_type: PostType,
        #[clap(long)]
        title: String,
        #[clap(long)]
        description: String,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        price: Option<f64>,
        #[clap(long, value_parser = parse_price_unit)]
        price_unit: Option<PriceUnit>,
    },
    /// Edit one of your posts.
    UpdatePost {
        id: Uuid,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        price: Option<f64>,
        #[clap(long, value_parser = parse_price_unit)]
        price_unit: Option<PriceUnit>,
    },
    /// Remove one of your posts.
    DeletePost { id: Uuid },
    /// Add or remove a post from your favorites.
    Favorite {
        id: Uuid,
        /// Remove instead of add.
        #[clap(long)]
        remove: bool,
    },
    /// List your favorited posts.
    Favorites,
    /// List your own posts.
    MyPosts,
    /// Send a direct message to another user.
    SendMessage {
        #[clap(long)]
        to: String,
        #[clap(long)]
        subject: String,
        #[clap(long)]
        body: String,
    },
    /// Show your inbox.
    Messages,
    /// Mark a message as read.
    ReadMessage { id: Uuid },
    /// Show your notifications.
    Notifications,
    /// Mark a notification as read.
    ReadNotification { id: Uuid },
    /// Send feedback about the site.
    Feedback {
        #[clap(long)]
        subject: Option<String>,
        #[clap(long)]
        body: String,
        /// 1 to 5.
        #[clap(long)]
        rating: i16,
    },
}

fn parse_category(value: &str) -> Result<PostType, String> {
    match value {
        "job" => Ok(PostType::Job),
        "deal" => Ok(PostType::Deal),
        other => Err(format!("unknown category: {other} (expected job or deal)")),
    }
}

fn parse_sort(value: &str) -> Result<SortKey, String> {
    match value {
        "newest" => Ok(SortKey::Newest),
        "oldest" => Ok(SortKey::Oldest),
        "price-low" => Ok(SortKey::PriceLow),
        "price-high" => Ok(SortKey::PriceHigh),
        other => Err(format!(
            "unknown sort key: {other} (expected newest, oldest, price-low or price-high)"
        )),
    }
}

fn parse_price_unit(value: &str) -> Result<PriceUnit, String> {
    match value {
        "hourly" => Ok(PriceUnit::Hourly),
        "daily" => Ok(PriceUnit::Daily),
        "monthly" => Ok(PriceUnit::Monthly),
        "yearly" => Ok(PriceUnit::Yearly),
        "fixed" => Ok(PriceUnit::Fixed),
        other => Err(format!("unknown price unit: {other}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let mut client = ZendeaClient::connect(&args.server)?;

    match args.command {
        Command::Register {
            email,
            name,
            password,
        } => {
            let user = client
                .register(&email, name.as_deref(), &password)
                .await?;
            println!("Registered and signed in as {}", user.email);
        }
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("Signed in as {}", user.email);
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out");
        }
        Command::Me => {
            client.restore_session().await?;
            match client.session().current().user() {
                Some(user) => println!("{} <{}>", user.name, user.email),
                None => println!("Not signed in"),
            }
        }
        Command::Search {
            query,
            category,
            location,
            max_price,
            sort,
        } => {
            let criteria = FilterCriteria {
                query: query.unwrap_or_default(),
                category,
                location: location.unwrap_or_default(),
                max_price,
                sort: sort.unwrap_or_default(),
            };
            eprintln!("Loading posts...");
            let posts = client.search_posts(&criteria).await?;
            println!("Posts ({})", posts.len());
            for post in posts {
                let price = post.price_label().unwrap_or_default();
                println!(
                    "- [{}] {} {} {} (by {})",
                    post.id, post.post_type, post.title, price, post.posted_by_name
                );
            }
        }
        Command::GetPost { id } => {
            let post = client.get_post(id).await?;
            println!("{} ({})", post.title, post.post_type);
            println!("{}", post.description);
            if let Some(location) = &post.location {
                println!("Location: {location}");
            }
            if let Some(price) = post.price_label() {
                println!("Price: {price}");
            }
            println!("Posted by {}", post.posted_by_name);
        }
        Command::CreatePost {
            post_type,
            title,
            description,
            location,
            price,
            price_unit,
        } => {
            let post = client
                .create_post(&NewPost {
                    post_type,
                    title,
                    description,
                    location,
                    price,
                    price_unit,
                })
                .await?;
            println!("Post created! ID: {}", post.id);
        }
        Command::UpdatePost {
            id,
            title,
            description,
            location,
            price,
            price_unit,
        } => {
            let post = client
                .update_post(
                    id,
                    &PostPatch {
                        title,
                        description,
                        location,
                        price,
                        price_unit,
                    },
                )
                .await?;
            println!("Post updated: {}", post.title);
        }
        Command::DeletePost { id } => {
            client.delete_post(id).await?;
            println!("Post deleted");
        }
        Command::Favorite { id, remove } => {
            let favorited = client.set_favorite(id, !remove).await?;
            if favorited {
                println!("Added to favorites");
            } else {
                println!("Removed from favorites");
            }
        }
        Command::Favorites => {
            eprintln!("Loading favorites...");
            let posts = client.favorites().await?;
            println!("Favorites ({})", posts.len());
            for post in posts {
                println!("- [{}] {}", post.id, post.title);
            }
        }
        Command::MyPosts => {
            eprintln!("Loading your posts...");
            let posts = client.my_posts().await?;
            println!("Your posts ({})", posts.len());
            for post in posts {
                println!("- [{}] {} ({})", post.id, post.title, post.post_type);
            }
        }
        Command::SendMessage { to, subject, body } => {
            client.send_message(&to, &subject, &body).await?;
            println!("Message sent to {to}");
        }
        Command::Messages => {
            let messages = client.messages().await?;
            println!("Messages ({})", messages.len());
            for message in messages {
                let marker = if message.read { " " } else { "*" };
                println!(
                    "{marker} [{}] {} (from {})",
                    message.id, message.subject, message.sender_email
                );
            }
        }
        Command::ReadMessage { id } => {
            client.mark_message_read(id).await?;
            println!("Marked as read");
        }
        Command::Notifications => {
            let notifications = client.notifications().await?;
            println!("Notifications ({})", notifications.len());
            for notification in notifications {
                let marker = if notification.read { " " } else { "*" };
                println!("{marker} [{}] {}", notification.id, notification.title);
            }
        }
        Command::ReadNotification { id } => {
            client.mark_notification_read(id).await?;
            println!("Marked as read");
        }
        Command::Feedback {
            subject,
            body,
            rating,
        } => {
            client.send_feedback(subject.as_deref(), &body, rating).await?;
            println!("Thanks for the feedback!");
        }
    }

    Ok(())
}
