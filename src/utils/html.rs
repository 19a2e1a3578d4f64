// src/utils/html.rs

use std::collections::HashSet;

/// Strips markup from user-supplied profile text.
///
/// No tags are allowed. `<script>` and `<style>` lose their content as well,
/// every other tag is reduced to its text.
pub fn clean_text(input: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder.tags(HashSet::<&str>::new());
    builder.clean(input).to_string().trim().to_string()
}
