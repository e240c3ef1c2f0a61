use clap::{Args, Subcommand, ValueEnum};
use std::sync::Arc;

use brewbuddy_core::{
    BrewEntry, EntryPanel, FileStore, JournalController, LoadState, LocalAuth, Session,
};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct BrewCommand {
    #[command(subcommand)]
    pub command: BrewSubcommand,
}

#[derive(Subcommand)]
pub enum BrewSubcommand {
    /// Record a new brew
    Add {
        /// Name of the brew
        name: String,

        /// Tasting notes
        #[arg(long, default_value = "")]
        notes: String,

        /// Rating from 0 to 5
        #[arg(long, default_value_t = 0.0)]
        rating: f64,
    },

    /// List all brews, best rated first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one brew's details
    Show {
        /// Brew key
        key: String,
    },

    /// Update an existing brew
    Update {
        /// Brew key
        key: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New tasting notes
        #[arg(long)]
        notes: Option<String>,

        /// New rating from 0 to 5
        #[arg(long)]
        rating: Option<f64>,
    },

    /// Delete a brew
    Delete {
        /// Brew key
        key: String,
    },
}

impl BrewCommand {
    pub async fn run(
        &self,
        session: &Session<FileStore, LocalAuth>,
        store: Arc<FileStore>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let identity = session
            .current_identity()
            .ok_or("not logged in; run `brewbuddy auth login` first")?;

        let mut controller = JournalController::new(store);
        controller.load_entries(&identity.uid);

        match &self.command {
            BrewSubcommand::Add {
                name,
                notes,
                rating,
            } => {
                let mut panel = EntryPanel::new();
                panel.begin_add();
                if let Some(draft) = panel.editing_mut() {
                    draft.name = name.clone();
                    draft.notes = notes.clone();
                    draft.rating = *rating;
                }
                if let Some(draft) = panel.take_submission() {
                    let key = controller.create(&draft).await?;
                    println!("Added brew '{}' ({})", name, key);
                }
            }
            BrewSubcommand::List { format } => {
                if let LoadState::Failed(reason) = controller.load_state() {
                    return Err(format!("failed to load brews: {}", reason).into());
                }
                let entries = controller.entries_sorted();
                match format {
                    OutputFormat::Json => {
                        let items: Vec<serde_json::Value> = entries
                            .iter()
                            .map(|e| {
                                serde_json::json!({
                                    "key": e.key,
                                    "name": e.name,
                                    "notes": e.notes,
                                    "rating": e.rating,
                                })
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&items)?);
                    }
                    OutputFormat::Text => {
                        if entries.is_empty() {
                            println!("No brews yet. Add your first brew!");
                        } else {
                            for entry in &entries {
                                println!(
                                    "{:<36}  {:>3.1}  {}",
                                    entry.key.as_deref().unwrap_or("-"),
                                    entry.rating,
                                    entry.name
                                );
                            }
                        }
                    }
                }
            }
            BrewSubcommand::Show { key } => {
                let entry = find_entry(&controller, key)?;
                let mut panel = EntryPanel::new();
                panel.show_details(entry);
                if let Some(entry) = panel.viewing() {
                    print!("{}", entry);
                }
            }
            BrewSubcommand::Update {
                key,
                name,
                notes,
                rating,
            } => {
                let entry = find_entry(&controller, key)?;
                let mut panel = EntryPanel::new();
                panel.begin_edit(entry);
                if let Some(draft) = panel.editing_mut() {
                    if let Some(name) = name {
                        draft.name = name.clone();
                    }
                    if let Some(notes) = notes {
                        draft.notes = notes.clone();
                    }
                    if let Some(rating) = rating {
                        draft.rating = *rating;
                    }
                }
                if let Some(draft) = panel.take_submission() {
                    controller.update(&draft).await?;
                    println!("Updated brew {}", key);
                }
            }
            BrewSubcommand::Delete { key } => {
                controller.delete(key).await?;
                println!("Deleted brew {}", key);
            }
        }

        Ok(())
    }
}

fn find_entry(
    controller: &JournalController<FileStore>,
    key: &str,
) -> Result<BrewEntry, Box<dyn std::error::Error>> {
    controller
        .entries_sorted()
        .into_iter()
        .find(|e| e.key.as_deref() == Some(key))
        .ok_or_else(|| format!("no brew with key {}", key).into())
}
