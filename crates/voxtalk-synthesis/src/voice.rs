use voxtalk_core::VoiceCatalogEntry;

fn is_english(voice: &VoiceCatalogEntry) -> bool {
    voice.lang.to_ascii_lowercase().starts_with("en")
}

/// Pick a voice in catalog order: an English voice whose name carries one of
/// `quality_markers`, else any English voice, else `None` (provider default).
pub fn select_voice<'a>(
    catalog: &'a [VoiceCatalogEntry],
    quality_markers: &[String],
) -> Option<&'a VoiceCatalogEntry> {
    catalog
        .iter()
        .find(|v| is_english(v) && quality_markers.iter().any(|m| v.name.contains(m.as_str())))
        .or_else(|| catalog.iter().find(|v| is_english(v)))
}
