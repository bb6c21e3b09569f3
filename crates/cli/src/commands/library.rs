use eyre::Result;
use quire_export::index::has_entry;
use quire_storage::ProjectStorage;

/// List projects in the library with their published state.
pub async fn handle_list_command(storage: &dyn ProjectStorage) -> Result<()> {
    let projects = storage.list_projects().await?;
    if projects.is_empty() {
        println!("📚 No projects found in library");
        println!("💡 Create a directory with manuscript.txt and a metadata/ folder to get started");
        return Ok(());
    }

    let index = storage.read_index().await?.unwrap_or_default();

    println!("📚 {} projects:", projects.len());
    for project in &projects {
        let status = if has_entry(&index, project.id.as_str()) {
            "published"
        } else if !project.has_manuscript {
            "no manuscript"
        } else if !project.has_metadata {
            "no metadata"
        } else {
            "draft"
        };
        println!(
            "  📖 {} [{}] {} artifacts",
            project.id,
            status,
            project.artifacts.len()
        );
        for artifact in &project.artifacts {
            println!("     {} {}", artifact.kind.label(), artifact.file_name);
        }
    }
    Ok(())
}
