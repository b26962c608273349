use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let asset_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));

    let mut app = clachan::default();
    let (handles, sky) = clachan::demo::build_street_scene(app.scene_mut(), &asset_dir)?;
    app.set_handles(handles);
    app.set_environment(sky);
    app.run();

    Ok(())
}
