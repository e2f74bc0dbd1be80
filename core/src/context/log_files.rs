use std::path::Path;

/// Split a standard log filename (`eqlog_<Player>_<server>.txt`) into
/// player and server.
pub fn parse_log_filename(filename: &str) -> Option<(String, String)> {
    let stem = filename.strip_suffix(".txt").unwrap_or(filename);
    let rest = stem.strip_prefix("eqlog_")?;
    let (player, server) = rest.split_once('_')?;

    if player.is_empty() || server.is_empty() {
        return None;
    }
    Some((player.to_string(), server.to_string()))
}

/// Player name from a log path, if the filename follows the standard layout.
pub fn player_from_path(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|f| f.to_str())
        .and_then(parse_log_filename)
        .map(|(player, _)| player)
}
