//! Command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use vistier_core::{
    layout, Category, ClassifierBackend, ClassifierClient, IngestConfig, Ingestor, MemoryStore,
};

pub async fn cmd_import(
    file: &Path,
    user: &str,
    label: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let content =
        fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;

    println!("📥 Importing {}...", file.display());

    let classifier = ClassifierClient::from_env();
    let classifier_name = classifier
        .as_ref()
        .map(|c| format!("{} via {}", c.model(), c.host()));

    let ingestor = Ingestor::new(IngestConfig::from_env(), classifier);
    let store = MemoryStore::new();

    let outcome = ingestor
        .ingest(user, &content, &filename_of(file), label.unwrap_or(""), &store)
        .await?;

    println!("✅ Import complete!");
    println!("   Transactions: {}", outcome.transactions_imported);
    println!("   Source label: {}", outcome.source.bank_label);
    println!(
        "   Source hash:  {}…",
        &outcome.source.source_account_hash[..12.min(outcome.source.source_account_hash.len())]
    );
    if outcome.used_classifier {
        println!(
            "   Categorized by: {}",
            classifier_name.unwrap_or_else(|| "classifier".to_string())
        );
    } else {
        println!("   Categorized by: keyword rules");
        if classifier_name.is_none() {
            println!();
            println!("💡 Tip: Set OLLAMA_HOST to enable model-based categorization");
        }
    }

    if let Some(out) = out {
        let uploads = store.uploads();
        let upload = uploads.last().expect("upload was just persisted");
        let json = serde_json::json!({
            "source": upload.source,
            "transactions": upload.transactions,
        });
        fs::write(out, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("Failed to write output file: {}", out.display()))?;
        println!("   Wrote anonymized upload to {}", out.display());
    }

    Ok(())
}

pub fn cmd_categories() -> Result<()> {
    for category in Category::ALL {
        println!("{}", category);
    }
    Ok(())
}

pub fn cmd_layouts() -> Result<()> {
    println!("{}", layout::supported_layouts());
    Ok(())
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
