use crate::utils::Result;
use std::path::Path;

pub fn create_writer<T, F>(output_dir: &Path, file_name: &str, f: F) -> Result<T>
where
    F: FnOnce(&Path) -> Result<T>,
{
    let output_path = output_dir.join(file_name);
    f(&output_path)
}

/// Keeps model names usable as file name components.
pub fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_model_names() {
        assert_eq!(sanitize_file_component("RdRP_1"), "RdRP_1");
        assert_eq!(sanitize_file_component("a/b c"), "a_b_c");
    }
}
