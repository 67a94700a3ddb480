// Lifevault — CLI Command Handlers
//
// Each function handles one subcommand. They coordinate the auth service
// (credentials, lockout), the vault service (entries, contacts, events),
// and the crypto layer, all over one explicitly opened database handle.

use std::path::PathBuf;

use crate::auth::AuthService;
use crate::crypto::Cipher;
use crate::error::LifevaultError;
use crate::store::{Account, Category, Database, SqliteVaultStore, VaultEntry};
use crate::vault::{parse_category_list, Session, VaultError, VaultService};

use super::{Commands, ContactCommands};

/// Default directory for lifevault data files.
fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("lifevault")
}

/// Path to the database file.
fn db_path() -> PathBuf {
    data_dir().join("lifevault.db")
}

/// Path to the symmetric key file.
fn key_path() -> PathBuf {
    data_dir().join("vault.key")
}

/// Execute the parsed CLI command.
pub fn execute(command: Commands) -> Result<(), LifevaultError> {
    match command {
        Commands::Init => cmd_init(),
        Commands::Categories => cmd_categories(),
        Commands::Register {
            handle,
            secret,
            pin,
            email,
        } => cmd_register(handle, secret, pin, email),
        Commands::Add {
            handle,
            secret,
            category,
            title,
            content,
        } => cmd_add(handle, secret, category, title, content),
        Commands::List {
            handle,
            secret,
            json,
        } => cmd_list(handle, secret, json),
        Commands::Search {
            handle,
            secret,
            term,
        } => cmd_search(handle, secret, term),
        Commands::Edit {
            handle,
            secret,
            id,
            category,
            title,
            content,
        } => cmd_edit(handle, secret, id, category, title, content),
        Commands::Delete { handle, secret, id } => cmd_delete(handle, secret, id),
        Commands::Stats { handle, secret } => cmd_stats(handle, secret),
        Commands::Contact { command } => match command {
            ContactCommands::Add {
                handle,
                secret,
                name,
                phone,
                email,
                categories,
            } => cmd_contact_add(handle, secret, name, phone, email, categories),
            ContactCommands::List { handle, secret } => cmd_contact_list(handle, secret),
            ContactCommands::Edit {
                handle,
                secret,
                id,
                name,
                phone,
                email,
                categories,
            } => cmd_contact_edit(handle, secret, id, name, phone, email, categories),
            ContactCommands::Delete { handle, secret, id } => {
                cmd_contact_delete(handle, secret, id)
            }
        },
        Commands::Emergency { handle, pin } => cmd_emergency(handle, pin),
        Commands::ChangePassword {
            handle,
            current,
            new,
        } => cmd_change_password(handle, current, new),
        Commands::UpdateEmail {
            handle,
            secret,
            new_email,
        } => cmd_update_email(handle, secret, new_email),
        Commands::Status { handle, secret } => cmd_status(handle, secret),
        Commands::ChangePin {
            handle,
            secret,
            new_pin,
        } => cmd_change_pin(handle, secret, new_pin),
        Commands::Events {
            handle,
            secret,
            limit,
            json,
        } => cmd_events(handle, secret, limit, json),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Open the database and load (or create) the vault key.
fn open_vault() -> Result<(Database, Cipher), LifevaultError> {
    let path = db_path();
    if !path.exists() {
        return Err(LifevaultError::Other(format!(
            "Vault not found at {}. Run `lifevault init` first.",
            path.display()
        )));
    }

    let db = Database::open(&path)?;
    let cipher = Cipher::load_or_generate(&key_path())?;
    Ok((db, cipher))
}

fn login(store: &SqliteVaultStore<'_>, handle: &str, secret: &str) -> Result<Account, LifevaultError> {
    Ok(AuthService::new(store).authenticate(handle, secret)?)
}

fn parse_category(raw: &str) -> Result<Category, LifevaultError> {
    let category = raw
        .parse::<Category>()
        .map_err(VaultError::Validation)?;
    Ok(category)
}

fn print_entry(entry: &VaultEntry, cipher: &Cipher) {
    let content = match entry.decrypted_content(cipher) {
        Ok(content) => content,
        Err(_) => "[undecryptable — wrong key or corrupt data]".to_string(),
    };
    println!("  [{}] {}: {}", entry.id, entry.title, content);
    println!(
        "       created {} │ updated {}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.updated_at.format("%Y-%m-%d %H:%M"),
    );
}

fn print_entries_grouped(entries: &[VaultEntry], cipher: &Cipher) {
    for category in Category::ALL {
        let in_category: Vec<&VaultEntry> =
            entries.iter().filter(|e| e.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        println!("\n{} — {}", category.display_name(), category.description());
        println!("{:-<60}", "");
        for entry in in_category {
            print_entry(entry, cipher);
        }
    }
}

// ─── Init / categories ───────────────────────────────────────────────────────

fn cmd_init() -> Result<(), LifevaultError> {
    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let path = db_path();
    let _db = Database::open(&path)?;
    let _cipher = Cipher::load_or_generate(&key_path())?;

    println!("✓ Lifevault initialized");
    println!("  Database: {}", path.display());
    println!("  Key file: {}", key_path().display());
    println!();
    println!("Next: create an account with `lifevault register --handle <name> --secret <password> --pin <4 digits>`");

    Ok(())
}

fn cmd_categories() -> Result<(), LifevaultError> {
    println!("Entry categories:\n");
    for category in Category::ALL {
        println!("  {:10} — {}", category.key(), category.description());
    }
    Ok(())
}

// ─── Accounts ────────────────────────────────────────────────────────────────

fn cmd_register(
    handle: String,
    secret: String,
    pin: String,
    email: Option<String>,
) -> Result<(), LifevaultError> {
    let (db, _cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);

    let account = AuthService::new(&store).register(&handle, &secret, email.as_deref(), &pin)?;

    println!("✓ Account created");
    println!("  Handle: {}", account.handle);
    println!("  Log in by passing --handle and --secret to any command.");
    Ok(())
}

fn cmd_change_password(
    handle: String,
    current: String,
    new: String,
) -> Result<(), LifevaultError> {
    let (db, _cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let auth = AuthService::new(&store);

    let account = auth.authenticate(&handle, &current)?;
    auth.change_secret(account.id, &current, &new)?;

    println!("✓ Password changed");
    Ok(())
}

fn cmd_change_pin(
    handle: String,
    secret: String,
    new_pin: String,
) -> Result<(), LifevaultError> {
    let (db, _cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let auth = AuthService::new(&store);

    let account = auth.authenticate(&handle, &secret)?;
    auth.change_pin(account.id, &secret, &new_pin)?;

    println!("✓ Emergency PIN changed");
    Ok(())
}

fn cmd_update_email(
    handle: String,
    secret: String,
    new_email: String,
) -> Result<(), LifevaultError> {
    let (db, _cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let auth = AuthService::new(&store);

    let account = auth.authenticate(&handle, &secret)?;
    let previous = account.email.as_deref().unwrap_or("not set");
    auth.update_email(account.id, &secret, &new_email)?;

    println!("✓ Email updated");
    println!("  Previous: {}", previous);
    println!("  Current:  {}", new_email.trim());
    Ok(())
}

fn cmd_status(handle: String, secret: String) -> Result<(), LifevaultError> {
    let (db, _cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let auth = AuthService::new(&store);

    let account = auth.authenticate(&handle, &secret)?;
    let status = auth.lock_status(account.id)?;

    println!("Account security status:");
    println!(
        "  Failed login attempts (last {} hours): {}/{}",
        crate::auth::LOCKOUT_WINDOW_HOURS,
        status.login_failures,
        crate::auth::LOCKOUT_THRESHOLD,
    );
    println!(
        "  Failed PIN attempts (last {} hours):   {}/{}",
        crate::auth::LOCKOUT_WINDOW_HOURS,
        status.pin_failures,
        crate::auth::LOCKOUT_THRESHOLD,
    );

    if status.pin_locked() {
        println!("  ⚠ Emergency access is locked until recent PIN failures age out.");
    } else {
        println!("  ✓ No active locks.");
    }
    Ok(())
}

// ─── Entries ─────────────────────────────────────────────────────────────────

fn cmd_add(
    handle: String,
    secret: String,
    category: String,
    title: String,
    content: String,
) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let category = parse_category(&category)?;

    let mut session = Session::open(&vault, account)?;
    let id = session.add_entry(&vault, category, &title, &content)?;

    println!("✓ Entry stored");
    println!("  ID:       {}", id);
    println!("  Category: {}", category.key());
    Ok(())
}

fn cmd_list(handle: String, secret: String, json: bool) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let session = Session::open(&vault, account)?;

    if session.entries().is_empty() {
        println!("No entries stored yet.");
        return Ok(());
    }

    if json {
        let items: Vec<serde_json::Value> = session
            .entries()
            .iter()
            .map(|e| {
                serde_json::json!({
                    "id": e.id,
                    "category": e.category.key(),
                    "title": e.title,
                    "content": e.decrypted_content(&cipher).ok(),
                    "created_at": e.created_at,
                    "updated_at": e.updated_at,
                })
            })
            .collect();
        let rendered = serde_json::to_string_pretty(&items)
            .map_err(|e| LifevaultError::Other(format!("JSON encoding failed: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Stored entries ({}):", session.entries().len());
    print_entries_grouped(session.entries(), &cipher);
    Ok(())
}

fn cmd_search(handle: String, secret: String, term: String) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let results = vault.search_entries(account.id, &term)?;

    if results.is_empty() {
        println!("No entries match '{}'.", term);
        return Ok(());
    }

    println!("Found {} matching entries:", results.len());
    print_entries_grouped(&results, &cipher);
    Ok(())
}

fn cmd_edit(
    handle: String,
    secret: String,
    id: i64,
    category: Option<String>,
    title: Option<String>,
    content: Option<String>,
) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let category = category.as_deref().map(parse_category).transpose()?;

    let mut session = Session::open(&vault, account)?;
    session.edit_entry(&vault, id, category, title.as_deref(), content.as_deref())?;

    println!("✓ Entry {} updated", id);
    Ok(())
}

fn cmd_delete(handle: String, secret: String, id: i64) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let mut session = Session::open(&vault, account)?;
    session.delete_entry(&vault, id)?;

    println!("✓ Entry {} deleted", id);
    Ok(())
}

fn cmd_stats(handle: String, secret: String) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let session = Session::open(&vault, account)?;
    let entries = session.entries();

    println!("Total entries: {}", entries.len());
    println!("\nBy category:");
    for category in Category::ALL {
        let count = entries.iter().filter(|e| e.category == category).count();
        if count > 0 {
            println!("  {:10} {}", category.key(), count);
        }
    }

    let mut recent: Vec<&VaultEntry> = entries.iter().collect();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    if !recent.is_empty() {
        println!("\nRecent updates:");
        for entry in recent.iter().take(5) {
            println!(
                "  {} ({})",
                entry.title,
                entry.updated_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

// ─── Emergency contacts ──────────────────────────────────────────────────────

fn cmd_contact_add(
    handle: String,
    secret: String,
    name: String,
    phone: String,
    email: Option<String>,
    categories: String,
) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let allowed = parse_category_list(&categories)?;
    let contact = vault.add_contact(account.id, &name, &phone, email.as_deref(), &allowed)?;

    println!("✓ Emergency contact added");
    println!("  ID:     {}", contact.id);
    println!("  Name:   {}", contact.name);
    println!("  Access: {}", Category::join_keys(&contact.allowed_categories));
    Ok(())
}

fn cmd_contact_list(handle: String, secret: String) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let contacts = vault.list_contacts(account.id)?;

    if contacts.is_empty() {
        println!("No emergency contacts configured.");
        return Ok(());
    }

    println!("Emergency contacts ({}):\n", contacts.len());
    for contact in &contacts {
        println!("  [{}] {} ({})", contact.id, contact.name, contact.phone);
        if let Some(ref email) = contact.email {
            println!("       Email:  {}", email);
        }
        println!(
            "       Access: {}",
            Category::join_keys(&contact.allowed_categories)
        );
    }
    Ok(())
}

fn cmd_contact_edit(
    handle: String,
    secret: String,
    id: i64,
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    categories: Option<String>,
) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let allowed = categories.as_deref().map(parse_category_list).transpose()?;
    vault.edit_contact(
        account.id,
        id,
        name.as_deref(),
        phone.as_deref(),
        email.as_deref(),
        allowed.as_deref(),
    )?;

    println!("✓ Contact {} updated", id);
    Ok(())
}

fn cmd_contact_delete(handle: String, secret: String, id: i64) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    vault.delete_contact(account.id, id)?;

    println!("✓ Contact {} deleted", id);
    Ok(())
}

// ─── Emergency access ────────────────────────────────────────────────────────

fn cmd_emergency(handle: String, pin: String) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = AuthService::new(&store).authenticate_emergency(&handle, &pin)?;
    let (contacts, entries) = vault.emergency_view(account.id)?;

    println!("✓ Emergency access granted (read-only)");

    if contacts.is_empty() {
        println!("\nNo emergency contacts configured for this account.");
        return Ok(());
    }

    println!("\nEmergency contacts:");
    for contact in &contacts {
        println!("  • {} ({})", contact.name, contact.phone);
        if let Some(ref email) = contact.email {
            println!("    Email:  {}", email);
        }
        println!(
            "    Access: {}",
            Category::join_keys(&contact.allowed_categories)
        );
    }

    if entries.is_empty() {
        println!("\nNo entries in the permitted categories.");
        return Ok(());
    }

    println!("\nAccessible data:");
    print_entries_grouped(&entries, &cipher);
    Ok(())
}

// ─── Security events ─────────────────────────────────────────────────────────

fn cmd_events(
    handle: String,
    secret: String,
    limit: usize,
    json: bool,
) -> Result<(), LifevaultError> {
    let (db, cipher) = open_vault()?;
    let store = SqliteVaultStore::new(&db);
    let vault = VaultService::new(&store, &cipher);

    let account = login(&store, &handle, &secret)?;
    let events = vault.recent_events(account.id, limit)?;

    if json {
        let rendered = serde_json::to_string_pretty(&events)
            .map_err(|e| LifevaultError::Other(format!("JSON encoding failed: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    if events.is_empty() {
        println!("No security events recorded.");
        return Ok(());
    }

    println!("Recent security events (newest first):");
    println!("{:-<60}", "");
    for event in &events {
        let mut line = format!(
            "[{}] {}",
            event.created_at.format("%Y-%m-%d %H:%M:%S"),
            event.action
        );
        if let Some(ref detail) = event.detail {
            line.push_str(&format!(" ({})", detail));
        }
        println!("{}", line);
    }
    Ok(())
}
