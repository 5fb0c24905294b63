//! Built-in region lexicon and substring matcher.

use crate::region::RegionStrategy;
use async_trait::async_trait;

/// Known regions, in match priority order.
pub const REGIONS: [&str; 18] = [
    "台北", "新北", "桃園", "台中", "台南", "高雄", "新竹", "嘉義", "彰化", "雲林", "南投", "屏東",
    "宜蘭", "花蓮", "台東", "澎湖", "金門", "連江",
];

/// First region in lexicon order that occurs anywhere in `text`.
/// Ties go to lexicon order, not to position in the text.
pub fn match_region(text: &str) -> Option<&'static str> {
    REGIONS.iter().copied().find(|r| text.contains(r))
}

/// Lexicon match as a resolution strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconStrategy;

#[async_trait]
impl RegionStrategy for LexiconStrategy {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn resolve(&self, text: &str) -> Option<String> {
        match_region(text).map(str::to_string)
    }
}
