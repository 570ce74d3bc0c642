use crate::error::Result;
use crate::settings::{config_dir, load_settings, log_path, save_settings, shellexpand_path};

pub fn run(source: Option<String>, name: Option<String>, data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let changed = source.is_some() || name.is_some() || data_dir.is_some();

    if let Some(src) = source {
        settings.data_source = if src.is_empty() || crate::feed::is_remote(&src) {
            src
        } else {
            shellexpand_path(&src)
        };
    }
    if let Some(n) = name {
        settings.user_name = n;
    }
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if changed {
        save_settings(&settings)?;
        println!("Settings saved.\n");
    }

    println!("User:           {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Config dir:     {}", config_dir().display());
    println!("Data dir:       {}", settings.data_dir);
    println!("Record feed:    {}", settings.resolve_source(None));
    println!("Upload delay:   {} ms", settings.upload_delay_ms);
    println!("Success shown:  {} ms", settings.success_display_ms);
    println!("Log file:       {}", log_path().display());
    Ok(())
}
