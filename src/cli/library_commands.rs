//! One-shot library management: list, show, add, update, remove.

use std::error::Error;
use std::sync::Arc;

use clap::Args as ClapArgs;

use crate::api::transport::Transport;
use crate::commands::format_library_line;
use crate::core::library::{LibraryDraft, LibraryPatch, LibraryResource, SourceMode};
use crate::core::library_store::LibraryStore;
use crate::core::session::SessionSettings;

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    /// Display name
    pub name: String,
    /// Reference text to store
    #[arg(long, conflicts_with = "url", required_unless_present = "url")]
    pub content: Option<String>,
    /// URL the backend should fetch
    #[arg(long)]
    pub url: Option<String>,
    /// Short description shown in listings
    #[arg(short = 'd', long)]
    pub description: Option<String>,
}

impl AddArgs {
    pub fn into_draft(self) -> LibraryDraft {
        let draft = match (self.content, self.url) {
            (Some(content), _) => LibraryDraft::content(self.name, content),
            (None, Some(url)) => LibraryDraft::url(self.name, url),
            (None, None) => LibraryDraft::content(self.name, String::new()),
        };
        match self.description {
            Some(description) => draft.with_description(description),
            None => draft,
        }
    }
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(short = 'd', long)]
    pub description: Option<String>,
    /// Replace the stored text and switch the library to text mode
    #[arg(long, conflicts_with = "url")]
    pub content: Option<String>,
    /// Replace the URL and switch the library to URL mode
    #[arg(long)]
    pub url: Option<String>,
}

impl UpdateArgs {
    pub fn to_patch(&self) -> LibraryPatch {
        let source_mode = if self.content.is_some() {
            Some(SourceMode::Content)
        } else if self.url.is_some() {
            Some(SourceMode::Url)
        } else {
            None
        };
        LibraryPatch {
            name: self.name.clone(),
            description: self.description.clone(),
            source_mode,
            content: self.content.clone(),
            url: self.url.clone(),
        }
    }
}

fn store_for(transport: Arc<dyn Transport>, settings: &SessionSettings) -> LibraryStore {
    LibraryStore::new(transport, &settings.backend_url)
}

pub async fn list_libraries(
    transport: Arc<dyn Transport>,
    settings: &SessionSettings,
) -> Result<(), Box<dyn Error>> {
    let store = store_for(transport, settings);
    store.refresh().await?;

    println!("📚 Libraries on {}", store.base_url());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if store.is_empty() {
        println!("No libraries yet. Add one with: local-reason add <name> --content <text>");
        return Ok(());
    }
    for resource in store.list() {
        println!("{}", format_library_line(&resource, false));
    }
    Ok(())
}

pub async fn show_library(
    transport: Arc<dyn Transport>,
    settings: &SessionSettings,
    id: i64,
) -> Result<(), Box<dyn Error>> {
    let store = store_for(transport, settings);
    let resource = store.fetch(id).await?;
    print!("{}", render_library(&resource));
    Ok(())
}

pub fn render_library(resource: &LibraryResource) -> String {
    let mut out = format!("📖 {} (id {})\n", resource.name, resource.id);
    if let Some(description) = resource.description.as_deref() {
        out.push_str(&format!("   {description}\n"));
    }
    out.push_str(&format!("   Source: {}\n", resource.source_mode));
    match resource.source_mode {
        SourceMode::Url => {
            out.push_str(&format!("   URL: {}\n", resource.url.as_deref().unwrap_or("-")));
        }
        SourceMode::Content => {
            out.push('\n');
            out.push_str(resource.content.as_deref().unwrap_or(""));
            out.push('\n');
        }
    }
    out
}

pub async fn add_library(
    transport: Arc<dyn Transport>,
    settings: &SessionSettings,
    args: AddArgs,
) -> Result<(), Box<dyn Error>> {
    let store = store_for(transport, settings);
    let created = store.add(&args.into_draft()).await?;
    println!("✅ Added library {}: {}", created.id, created.name);
    Ok(())
}

pub async fn update_library(
    transport: Arc<dyn Transport>,
    settings: &SessionSettings,
    args: UpdateArgs,
) -> Result<(), Box<dyn Error>> {
    let store = store_for(transport, settings);
    store.update(args.id, &args.to_patch()).await?;
    println!("✅ Updated library {}", args.id);
    Ok(())
}

pub async fn remove_libraries(
    transport: Arc<dyn Transport>,
    settings: &SessionSettings,
    ids: &[i64],
) -> Result<(), Box<dyn Error>> {
    let store = store_for(transport, settings);
    let mut failed = 0;
    for (id, result) in store.remove_many(ids).await {
        match result {
            Ok(()) => println!("🗑️  Removed library {id}"),
            Err(e) => {
                eprintln!("❌ Could not remove library {id}: {e}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(format!("{failed} of {} removals failed", ids.len()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{FakeBackend, TEST_BASE_URL};

    fn settings() -> SessionSettings {
        SessionSettings {
            backend_url: TEST_BASE_URL.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn add_args_pick_the_source_mode() {
        let text = AddArgs {
            name: "notes".into(),
            content: Some("body".into()),
            url: None,
            description: Some("mine".into()),
        }
        .into_draft();
        assert_eq!(text.source_mode, SourceMode::Content);
        assert_eq!(text.description.as_deref(), Some("mine"));

        let link = AddArgs {
            name: "book".into(),
            content: None,
            url: Some("https://doc.rust-lang.org/book/".into()),
            description: None,
        }
        .into_draft();
        assert_eq!(link.source_mode, SourceMode::Url);
        assert_eq!(link.active_payload(), Some("https://doc.rust-lang.org/book/"));
    }

    #[test]
    fn update_args_switch_mode_only_when_payload_given() {
        let rename = UpdateArgs {
            id: 3,
            name: Some("renamed".into()),
            description: None,
            content: None,
            url: None,
        };
        assert_eq!(rename.to_patch().source_mode, None);

        let relink = UpdateArgs {
            url: Some("https://example.org".into()),
            ..rename
        };
        assert_eq!(relink.to_patch().source_mode, Some(SourceMode::Url));
    }

    #[test]
    fn rendering_shows_the_active_payload() {
        let resource = LibraryResource::from_draft(
            4,
            &LibraryDraft::url("tokio", "https://tokio.rs").with_description("runtime"),
        );
        let rendered = render_library(&resource);
        assert!(rendered.starts_with("📖 tokio (id 4)"));
        assert!(rendered.contains("URL: https://tokio.rs"));
    }

    #[tokio::test]
    async fn remove_reports_partial_failure() {
        let backend = Arc::new(FakeBackend::new());
        let kept = backend.seed(LibraryDraft::content("a", "x"));

        remove_libraries(backend.clone(), &settings(), &[kept])
            .await
            .expect("existing id removes");
        assert!(backend.rows().is_empty());

        // Missing ids count as removed; only transport failures fail.
        backend.fail_next(crate::api::transport::TransportError::NoResponse(
            "refused".into(),
        ));
        let err = remove_libraries(backend.clone(), &settings(), &[9])
            .await
            .expect_err("transport failure surfaces");
        assert!(err.to_string().contains("1 of 1"));
    }

    #[tokio::test]
    async fn add_then_show_round_trips_through_the_backend() {
        let backend = Arc::new(FakeBackend::new());
        add_library(
            backend.clone(),
            &settings(),
            AddArgs {
                name: "serde".into(),
                content: Some("derive docs".into()),
                url: None,
                description: None,
            },
        )
        .await
        .expect("add");

        let rows = backend.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content.as_deref(), Some("derive docs"));
        show_library(backend, &settings(), rows[0].id)
            .await
            .expect("show");
    }
}
