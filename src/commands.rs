//! Command handlers. Each command is one view visit: it gets its own
//! `ViewScope` and goes through the route guard before touching the API.

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use tracing::debug;

use shopadmin::app::{App, ViewError};
use shopadmin::auth::GateStatus;
use shopadmin::models::{Product, ProductDraft};
use shopadmin::router::View;
use shopadmin::scope::ViewScope;
use shopadmin::utils::{format_optional, format_remaining, strip_html, truncate_string};

use crate::cli::{Commands, LoginArgs, ProductFields, ProductsCommand, SettingsCommand};

/// Column widths for the product table
const NAME_WIDTH: usize = 28;
const CATEGORY_WIDTH: usize = 18;
const IMAGE_WIDTH: usize = 40;

pub async fn handle(app: &mut App, command: Commands, scope: &ViewScope) -> Result<()> {
    let result = match command {
        Commands::Login(args) => return login_view(app, args, scope).await,
        Commands::Logout => {
            app.logout()?;
            println!("Logged out");
            return Ok(());
        }
        Commands::Status => {
            status(app);
            return Ok(());
        }
        Commands::Products(cmd) => products(app, cmd, scope).await,
        Commands::Settings(cmd) => settings(app, cmd, scope).await,
    };

    match result {
        Err(ViewError::SessionRequired) => {
            // The requested command is not resumed after logging in.
            eprintln!("{}", ViewError::SessionRequired);
            login_view(app, LoginArgs::default(), scope).await
        }
        Err(e) => Err(anyhow!(e)),
        Ok(()) => Ok(()),
    }
}

async fn login_view(app: &mut App, args: LoginArgs, scope: &ViewScope) -> Result<()> {
    app.navigate(View::Login);

    let username = match args.username {
        Some(username) => username,
        None => prompt_username(app.config.last_username.as_deref())?,
    };
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };

    match app.login(&username, &password, scope).await {
        Ok(session) => {
            debug!(expires_at_ms = session.expires_at_ms, "Session stored");
            println!("Login successful");
            Ok(())
        }
        Err(e) => Err(anyhow!(e.user_message())),
    }
}

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), last) {
        (true, Some(last)) => Ok(last.to_string()),
        _ => Ok(input.to_string()),
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn status(app: &App) {
    match app.session_status() {
        GateStatus::Valid { .. } => {
            let remaining = app
                .gate()
                .remaining()
                .map(format_remaining)
                .unwrap_or_else(|| "0s".to_string());
            println!("Logged in, session expires in {}", remaining);
        }
        GateStatus::Missing => println!("Not logged in"),
        GateStatus::Expired => println!("Session expired"),
    }
}

// ===== Products =====

async fn products(app: &mut App, cmd: ProductsCommand, scope: &ViewScope) -> Result<(), ViewError> {
    match cmd {
        ProductsCommand::List => {
            let products = app.load_products(scope).await?;
            print_products(products);
        }
        ProductsCommand::Add(fields) => {
            let draft = apply_fields(ProductDraft::default(), fields);
            let products = app.create_product(&draft, scope).await?;
            println!("Changes saved");
            print_products(products);
        }
        ProductsCommand::Edit { id, fields } => {
            app.load_products(scope).await?;
            let current = app
                .find_product(&id)
                .map(ProductDraft::from_product)
                .ok_or_else(|| not_found(&id))?;
            let draft = apply_fields(current, fields);
            let products = app.update_product(&id, &draft, scope).await?;
            println!("Changes saved");
            print_products(products);
        }
        ProductsCommand::Delete { id, yes } => {
            let confirmed = yes
                || confirm("Are you sure you want to delete this product?").unwrap_or(false);
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
            let products = app.delete_product(&id, scope).await?;
            println!("Product deleted");
            print_products(products);
        }
    }
    Ok(())
}

fn not_found(id: &str) -> ViewError {
    ViewError::Api {
        message: "Product not found",
        source: shopadmin::api::ApiError::NotFound(id.to_string()),
    }
}

fn apply_fields(mut draft: ProductDraft, fields: ProductFields) -> ProductDraft {
    if let Some(name) = fields.name {
        draft.product_name = name;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(price) = fields.price {
        draft.price = price;
    }
    if let Some(categories) = fields.categories {
        draft.categories = categories;
    }
    if let Some(stock) = fields.stock {
        draft.stock = stock;
    }
    if !fields.images.is_empty() {
        draft.image_urls = fields.images;
    }
    draft
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products");
        return;
    }

    println!(
        "{:<8} {:<name$} {:>10} {:>6} {:<cat$} {}",
        "ID",
        "NAME",
        "PRICE",
        "STOCK",
        "CATEGORIES",
        "IMAGE",
        name = NAME_WIDTH,
        cat = CATEGORY_WIDTH,
    );
    for product in products {
        println!(
            "{:<8} {:<name$} {:>10} {:>6} {:<cat$} {}",
            format_optional(&product.id, "-"),
            truncate_string(&product.product_name, NAME_WIDTH),
            format_optional(&product.price, "-"),
            format_optional(&product.stock, "-"),
            truncate_string(&product.categories, CATEGORY_WIDTH),
            truncate_string(&product.first_image().unwrap_or_default(), IMAGE_WIDTH),
            name = NAME_WIDTH,
            cat = CATEGORY_WIDTH,
        );
    }
}

// ===== Settings =====

async fn settings(app: &mut App, cmd: SettingsCommand, scope: &ViewScope) -> Result<(), ViewError> {
    match cmd {
        SettingsCommand::Show => {
            let settings = app.load_settings(scope).await?;
            println!("Title:  {}", settings.title);
            println!("Logo:   {}", settings.logo);
            println!("Banner: {}", strip_html(&settings.banner));
        }
        SettingsCommand::Set {
            title,
            logo,
            banner,
        } => {
            let current = app.load_settings(scope).await?.clone();
            let next = current.merged(title, logo, banner);
            app.save_settings(next, scope).await?;
            println!("Settings saved");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_fields_keeps_unset_values() {
        let current = ProductDraft {
            product_name: "Mug".to_string(),
            description: "Ceramic".to_string(),
            price: "12".to_string(),
            categories: "kitchen".to_string(),
            stock: "4".to_string(),
            image_urls: vec!["https://cdn/a.png".to_string()],
        };
        let fields = ProductFields {
            price: Some("15".to_string()),
            ..Default::default()
        };
        let next = apply_fields(current.clone(), fields);
        assert_eq!(next.price, "15");
        assert_eq!(next.product_name, current.product_name);
        assert_eq!(next.image_urls, current.image_urls);
    }

    #[test]
    fn test_apply_fields_replaces_images() {
        let fields = ProductFields {
            images: vec!["https://cdn/b.png".to_string()],
            ..Default::default()
        };
        let next = apply_fields(ProductDraft::default(), fields);
        assert_eq!(next.image(), "https://cdn/b.png");
    }
}
