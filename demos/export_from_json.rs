use std::{env, fs::File, path::PathBuf};

use log::info;
use wxr_export::{
    core::step::StepBuilder,
    error::ExportError,
    item::wxr::{PostItemReader, WxrItemWriterBuilder},
    wxr::{MemoryExport, WxrFormatterBuilder},
};

/// Usage: `export_from_json [input.json] [output.xml]`
fn main() -> Result<(), ExportError> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demos/data/site.json"));
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("site.wxr.xml"));

    let file = File::open(&input).map_err(|e| {
        ExportError::DataSource(format!("Cannot open {}: {}", input.display(), e))
    })?;
    let export = MemoryExport::from_reader(file)?;

    let formatter = WxrFormatterBuilder::new()
        .source(&export)
        .comment_meta(&export)
        .build()?;

    let reader = PostItemReader::new(&export);
    let writer = WxrItemWriterBuilder::new()
        .formatter(&formatter)
        .from_path(&output)?;

    let step = StepBuilder::new()
        .name("export_from_json".to_string())
        .reader(&reader)
        .writer(&writer)
        .chunk(20)
        .build()?;

    let execution = step.execute()?;

    info!(
        "Exported {} posts to {} in {:?}",
        execution.write_count,
        output.display(),
        execution.duration
    );

    Ok(())
}
