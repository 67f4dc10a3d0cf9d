use super::{AppState, Command, Phase, ReducerContext, SelectionMode, Theme};
use crate::cli::{AuthCommands, Cli, Commands, OutfitCommands, WardrobeCommands};
use crate::config::Config;
use crate::media::{EncodedImage, detect_image_mime};
use crate::outfit::{EventType, GenerationRequest, OutfitLog, run_generation};
use crate::providers::GeminiClient;
use crate::security::{CredentialStore, SecretVault};
use crate::storage::{FileStore, KvStore};
use crate::wardrobe::{Category, WardrobeStore};
use anyhow::{Context as _, anyhow, bail};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Wire up the stores and route one CLI invocation.
pub async fn dispatch(cli: Cli, config: Config) -> anyhow::Result<()> {
    let kv: Arc<dyn KvStore> = Arc::new(FileStore::open(&config.data_dir)?);
    let credentials = CredentialStore::new(
        Arc::clone(&kv),
        SecretVault::new(&config.data_dir, config.secrets.encrypt),
    );
    let wardrobe = WardrobeStore::open(Arc::clone(&kv), config.media.max_file_size_mb)?;
    let log = OutfitLog::new(Arc::clone(&kv));

    match cli.command {
        Commands::Onboard { api_key } => onboard(&credentials, api_key),
        Commands::Wardrobe { wardrobe_command } => {
            run_wardrobe(&config, &wardrobe, &credentials, wardrobe_command).await
        }
        Commands::Outfit { outfit_command } => match outfit_command {
            OutfitCommands::Generate {
                event,
                theme,
                avatar,
                items,
                output,
            } => {
                generate(
                    &config,
                    &wardrobe,
                    &credentials,
                    &log,
                    &event,
                    theme.as_deref(),
                    avatar.as_deref(),
                    items,
                    output,
                )
                .await
            }
            OutfitCommands::History => history(&log),
        },
        Commands::Auth { auth_command } => run_auth(&credentials, auth_command),
        Commands::Status => status(&config, &wardrobe, &credentials, &log),
    }
}

fn onboard(credentials: &CredentialStore, api_key: Option<String>) -> anyhow::Result<()> {
    let key = match api_key {
        Some(key) => key,
        None => match prompt_for_key()? {
            Some(key) => key,
            None => {
                println!("Setup cancelled; no credential stored.");
                return Ok(());
            }
        },
    };
    credentials.set(&key)?;
    println!("{} credential stored", style("✓").green());
    Ok(())
}

async fn run_wardrobe(
    config: &Config,
    wardrobe: &WardrobeStore,
    credentials: &CredentialStore,
    command: WardrobeCommands,
) -> anyhow::Result<()> {
    match command {
        WardrobeCommands::Add { paths } => {
            let files = collect_upload_files(&paths)?;
            let total = files.len();
            let added = wardrobe.add_items(files)?;
            println!(
                "{} added {} of {} file(s)",
                style("✓").green(),
                added.len(),
                total
            );
            for item in &added {
                println!("  {}", style(&item.id).dim());
            }
            if added.len() < total {
                println!(
                    "  {} file(s) were not images and were skipped",
                    total - added.len()
                );
            }
            Ok(())
        }

        WardrobeCommands::List => {
            if wardrobe.is_empty() {
                println!("Wardrobe is empty. Add photos with `garderobe wardrobe add`.");
                return Ok(());
            }
            for item in wardrobe.items() {
                let marker = if item.is_eligible() {
                    style("eligible").green()
                } else if item.confirmed {
                    style("confirmed").yellow()
                } else {
                    style("unconfirmed").dim()
                };
                println!(
                    "{}  {}/{}  {}",
                    style(&item.id).dim(),
                    item.category,
                    item.subcategory,
                    marker
                );
            }
            Ok(())
        }

        WardrobeCommands::Remove { id } => {
            wardrobe.remove_item(&id)?;
            println!("{} removed (if present)", style("✓").green());
            Ok(())
        }

        WardrobeCommands::Categorize {
            id,
            category,
            subcategory,
        } => {
            let category = parse_category(&category)?;
            let item = wardrobe.categorize_item(&id, category, subcategory.as_deref())?;
            println!(
                "{} {} is now {}/{} (confirmed)",
                style("✓").green(),
                item.id,
                item.category,
                item.subcategory
            );
            Ok(())
        }

        WardrobeCommands::AutoCategorize { id } => {
            let api_key = require_credential(credentials)?;
            let client = build_client(config, &api_key);
            let item = wardrobe.auto_categorize_item(&id, &client).await?;
            println!(
                "{} suggested category: {} — confirm with `garderobe wardrobe confirm {}`",
                style("✓").green(),
                item.category,
                item.id
            );
            Ok(())
        }

        WardrobeCommands::Confirm { id } => {
            let item = wardrobe.confirm_item(&id)?;
            println!(
                "{} {} confirmed as {}/{}",
                style("✓").green(),
                item.id,
                item.category,
                item.subcategory
            );
            Ok(())
        }
    }
}

fn run_auth(credentials: &CredentialStore, command: AuthCommands) -> anyhow::Result<()> {
    match command {
        AuthCommands::Set { key } => onboard(credentials, key),
        AuthCommands::Clear => {
            credentials.clear()?;
            println!("{} credential removed", style("✓").green());
            Ok(())
        }
        AuthCommands::Status => {
            if credentials.is_present()? {
                println!("credential: stored");
            } else {
                println!("credential: not configured");
            }
            Ok(())
        }
    }
}

fn status(
    config: &Config,
    wardrobe: &WardrobeStore,
    credentials: &CredentialStore,
    log: &OutfitLog,
) -> anyhow::Result<()> {
    println!("data dir:        {}", config.data_dir.display());
    println!("items:           {}", wardrobe.len());
    println!("eligible items:  {}", wardrobe.eligible_items().len());
    println!("generated:       {}", log.len()?);
    println!(
        "credential:      {}",
        if credentials.is_present()? {
            "stored"
        } else {
            "not configured"
        }
    );
    Ok(())
}

fn history(log: &OutfitLog) -> anyhow::Result<()> {
    let records = log.records()?;
    if records.is_empty() {
        println!("No outfits generated yet.");
        return Ok(());
    }
    for (index, record) in records.iter().enumerate() {
        println!(
            "{:>3}  {}  {}  {}",
            index + 1,
            record.timestamp,
            record.event_type,
            record.image.mime_type
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn generate(
    config: &Config,
    wardrobe: &WardrobeStore,
    credentials: &CredentialStore,
    log: &OutfitLog,
    event: &str,
    theme: Option<&str>,
    avatar_path: Option<&Path>,
    items: Vec<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let event_type: EventType = event.parse().map_err(|_| {
        anyhow!(
            "unknown event type '{event}'; choose one of: {}",
            EventType::choices()
        )
    })?;

    let mut state = AppState::new();
    let ctx = ReducerContext {
        wardrobe_len: wardrobe.len(),
        credential_present: credentials.is_present()?,
    };

    if let Some(theme) = theme {
        let theme: Theme = theme
            .parse()
            .map_err(|_| anyhow!("unknown theme '{theme}'; choose african, asian or european"))?;
        state.apply(Command::SelectTheme(theme), &ctx)?;
    }

    let mode = if items.is_empty() {
        SelectionMode::Ai
    } else {
        SelectionMode::Manual
    };
    state.apply(Command::BeginSelection { mode }, &ctx)?;
    for id in &items {
        state.apply(Command::ToggleItem { id: id.clone() }, &ctx)?;
    }
    state.apply(Command::ConfirmSelection, &ctx)?;

    // Missing credential suspends the flow rather than failing it.
    if state.phase == Phase::CredentialSetup {
        match prompt_for_key()? {
            Some(key) => {
                credentials.set(&key)?;
                state.apply(Command::CredentialProvided, &ctx)?;
            }
            None => {
                state.apply(Command::CancelSetup, &ctx)?;
                println!("Generation cancelled; no credential stored.");
                return Ok(());
            }
        }
    }

    state.apply(Command::ChooseEventType(event_type), &ctx)?;

    let avatar = load_avatar(config, state.theme, avatar_path)?;
    let request = match mode {
        SelectionMode::Ai => {
            let request = GenerationRequest::ai_mode(event_type, avatar.clone(), wardrobe);
            if request.source_items.is_empty() {
                println!(
                    "{} no eligible items (confirmed, categorized); generating from the avatar alone",
                    style("note:").yellow()
                );
            }
            request
        }
        SelectionMode::Manual => GenerationRequest::manual(
            event_type,
            avatar.clone(),
            wardrobe.items_by_ids(state.selection.ids()),
        ),
    };

    let api_key = require_credential(credentials)?;
    let client = build_client(config, &api_key);

    match run_generation(&request, &client, log, config.generation.placeholder_on_failure).await {
        Ok(outcome) => {
            if let Some(error) = &outcome.error {
                println!("{} generation failed: {error}", style("error:").red());
                println!("Showing the unmodified avatar instead.");
            }
            state.apply(
                Command::GenerationSucceeded {
                    image: outcome.image.clone(),
                },
                &ctx,
            )?;
            let path = write_output(config, &outcome.image, output)?;
            println!("{} saved {}", style("✓").green(), path.display());
            Ok(())
        }
        Err(e) => {
            state.apply(
                Command::GenerationFailed {
                    reason: e.to_string(),
                },
                &ctx,
            )?;
            Err(e.into())
        }
    }
}

fn parse_category(raw: &str) -> anyhow::Result<Category> {
    let category: Category = raw.parse().map_err(|_| {
        anyhow!(
            "unknown category '{raw}'; choose one of: {}",
            Category::assignable()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    if category == Category::Unknown {
        bail!("cannot assign Unknown by hand; use auto-categorize or pick a real category");
    }
    Ok(category)
}

fn require_credential(credentials: &CredentialStore) -> anyhow::Result<String> {
    credentials.get()?.ok_or_else(|| {
        anyhow!("no API credential configured; run `garderobe onboard` or `garderobe auth set`")
    })
}

fn build_client(config: &Config, api_key: &str) -> GeminiClient {
    match config.provider.base_url.as_deref() {
        Some(base_url) => GeminiClient::with_base_url(
            api_key,
            &config.provider.generation_model,
            &config.provider.classifier_model,
            config.provider.temperature,
            base_url,
        ),
        None => GeminiClient::new(
            api_key,
            &config.provider.generation_model,
            &config.provider.classifier_model,
            config.provider.temperature,
        ),
    }
}

fn prompt_for_key() -> anyhow::Result<Option<String>> {
    let key = dialoguer::Password::new()
        .with_prompt("Gemini API key (empty to cancel)")
        .allow_empty_password(true)
        .interact()?;
    let key = key.trim().to_string();
    Ok(if key.is_empty() { None } else { Some(key) })
}

/// Gather upload payloads from files and (flat) directories.
fn collect_upload_files(paths: &[PathBuf]) -> anyhow::Result<Vec<(Vec<u8>, Option<String>)>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("failed to read directory {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            entries.sort();
            for entry in entries {
                files.push(read_upload(&entry)?);
            }
        } else {
            files.push(read_upload(path)?);
        }
    }
    Ok(files)
}

fn read_upload(path: &Path) -> anyhow::Result<(Vec<u8>, Option<String>)> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok((bytes, name))
}

fn load_avatar(
    config: &Config,
    theme: Theme,
    avatar_path: Option<&Path>,
) -> anyhow::Result<EncodedImage> {
    let path = match avatar_path {
        Some(path) => path.to_path_buf(),
        None => config.data_dir.join("avatars").join(theme.avatar_file()),
    };
    let bytes = fs::read(&path).with_context(|| {
        format!(
            "failed to read avatar {} (place the theme avatars under {}/avatars or pass --avatar)",
            path.display(),
            config.data_dir.display()
        )
    })?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let mime_type = detect_image_mime(&bytes, name.as_deref())
        .ok_or_else(|| anyhow!("avatar file {} is not an image", path.display()))?;
    Ok(EncodedImage::from_bytes(mime_type, &bytes))
}

fn write_output(
    config: &Config,
    image: &EncodedImage,
    output: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    let path = match output {
        Some(path) => path,
        None => {
            let outfits_dir = config.data_dir.join("outfits");
            fs::create_dir_all(&outfits_dir)?;
            let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
            outfits_dir.join(format!("outfit-{stamp}.{}", extension_from_mime(&image.mime_type)))
        }
    };
    fs::write(&path, image.decode()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn extension_from_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::{extension_from_mime, parse_category};
    use crate::wardrobe::Category;

    #[test]
    fn parse_category_accepts_taxonomy_names() {
        assert_eq!(parse_category("top").unwrap(), Category::Top);
        assert_eq!(parse_category("Shoes").unwrap(), Category::Shoes);
    }

    #[test]
    fn parse_category_rejects_unknown_and_garbage() {
        assert!(parse_category("Unknown").is_err());
        assert!(parse_category("spacesuit").is_err());
    }

    #[test]
    fn extension_follows_mime() {
        assert_eq!(extension_from_mime("image/png"), "png");
        assert_eq!(extension_from_mime("image/jpeg"), "jpg");
        assert_eq!(extension_from_mime("application/octet-stream"), "bin");
    }
}
