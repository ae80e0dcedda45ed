use super::storage::SloganTable;

/* Matcher finds which slogan, if any, a chat message earns points for.
 * Matching is a plain, case-sensitive substring test with no word boundaries,
 * tried in table order. Only the first hit counts, so one message scores at most once.
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SloganMatch {
    pub slogan: String,
    pub score: i64,
}

pub fn find_slogan(text: &str, slogans: &SloganTable) -> Option<SloganMatch> {
    slogans
        .iter()
        .find(|(slogan, _)| !slogan.is_empty() && text.contains(slogan))
        .map(|(slogan, score)| SloganMatch {
            slogan: slogan.to_string(),
            score,
        })
}
