//! Command implementations

use crate::cli::{EditArgs, TreeArgs};
use anyhow::{Context, bail};
use grc_client::constants::PREFERENCES_FILE_NAME;
use grc_client::domain::config::AppConfig;
use grc_client::domain::field::FieldDescriptor;
use grc_client::domain::tree::NodeId;
use grc_client::helpers::get_or_create_data_dir;
use grc_client::services::{CollectionItem, FilePreferenceGateway, FlashLog, JsonCollection, JsonFileRecord};
use grc_client::states::{InlineEdit, SaveCoordinator, SaveOutcome, TreeModel, TreeViewController, UiEvent};
use std::path::PathBuf;
use std::sync::Arc;

fn preferences_path(config: &AppConfig) -> anyhow::Result<PathBuf> {
    match &config.preferences_file {
        Some(path) => Ok(path.clone()),
        None => Ok(get_or_create_data_dir()
            .context("no data directory for display preferences")?
            .join(PREFERENCES_FILE_NAME)),
    }
}

pub async fn run_tree(config: &AppConfig, args: TreeArgs) -> anyhow::Result<()> {
    let collection = JsonCollection::open(&args.collection)
        .await
        .with_context(|| format!("failed to open {}", args.collection.display()))?;
    let gateway = FilePreferenceGateway::new(preferences_path(config)?);

    let mut tree = TreeViewController::init(&gateway, &config.tree, collection, TreeModel::<CollectionItem>::new())
        .await
        .context("tree view could not be initialized")?;

    tree.set_search(args.search);
    tree.set_page(args.page);
    tree.find().await.context("fetching the page failed")?;

    for id in args.collapse {
        tree.toggle_expanded(&NodeId::from(id), false).await?;
    }
    for id in args.expand {
        tree.toggle_expanded(&NodeId::from(id), true).await?;
    }

    for line in tree.renderer().outline() {
        println!("{line}");
    }

    let paging = tree.paging();
    println!(
        "Page {} of {} ({} items)",
        paging.current(),
        paging.total_pages().unwrap_or(1),
        paging.total().unwrap_or_default()
    );

    Ok(())
}

pub async fn run_edit(config: &AppConfig, args: EditArgs) -> anyhow::Result<()> {
    let Some(field) = config.fields.get(&args.field) else {
        bail!("no field `{}` in the [fields] configuration", args.field);
    };
    let descriptor = FieldDescriptor::try_from(field)?;

    let record = JsonFileRecord::open(&args.record)
        .await
        .with_context(|| format!("failed to open {}", args.record.display()))?;
    let flashes = Arc::new(FlashLog::default());

    let mut edit = InlineEdit::new(
        Arc::new(record),
        field,
        None,
        SaveCoordinator::default(),
        flashes.clone(),
    )?;

    edit.enable_edit(&mut UiEvent::new());
    edit.set_value(descriptor.parse_input(&args.value));
    let outcome = edit.save().await;

    if let Some(flash) = flashes.last() {
        println!("{}", serde_json::to_string(&flash.notification)?);
    }

    match outcome {
        SaveOutcome::RolledBack => bail!("`{}` was not saved", args.field),
        SaveOutcome::NoOp => println!("`{}` unchanged ({})", args.field, edit.value()),
        SaveOutcome::Saved | SaveOutcome::Ignored => {
            tracing::info!("{} = {}", args.field, edit.value());
        }
    }

    Ok(())
}
