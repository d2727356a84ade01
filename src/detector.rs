use crate::annotation::inline::ROUTER_MARKER;
use crate::annotation::CommentBlock;
use log::debug;

/// Sorts annotation blocks by what they describe.
///
/// Detection is a case-insensitive search for the one section each kind cannot do without:
/// - operations need `OpenAPI Path:` or an `@Router` directive
/// - the API description needs `OpenAPI API Title:`
/// - tag declarations need `OpenAPI Tag:`
///
/// A block may fall into more than one kind.
pub struct BlockDetector;

/// Blocks of each kind, in discovery order
#[derive(Debug, Default)]
pub struct DetectionResult<'a> {
    pub api_blocks: Vec<&'a CommentBlock>,
    pub operation_blocks: Vec<&'a CommentBlock>,
    pub tag_blocks: Vec<&'a CommentBlock>,
}

const OPERATION_KEYWORD: &str = "openapi path:";
const API_KEYWORD: &str = "openapi api title:";
const TAG_KEYWORD: &str = "openapi tag:";

impl BlockDetector {
    /// Classify the given annotation blocks.
    ///
    /// # Example
    ///
    /// ```
    /// use openapi_from_comments::annotation::CommentBlock;
    /// use openapi_from_comments::detector::BlockDetector;
    ///
    /// let block = CommentBlock {
    ///     package_path: "crate".to_string(),
    ///     item_name: None,
    ///     text: "OpenAPI Path:\n  /health".to_string(),
    /// };
    /// let blocks = [block];
    /// let result = BlockDetector::detect(&blocks);
    /// assert_eq!(result.operation_blocks.len(), 1);
    /// ```
    pub fn detect(blocks: &[CommentBlock]) -> DetectionResult<'_> {
        debug!("Detecting block kinds in {} blocks", blocks.len());

        let mut result = DetectionResult::default();
        for block in blocks {
            let lowered = block.text.to_lowercase();
            if lowered.contains(OPERATION_KEYWORD) || lowered.contains(ROUTER_MARKER) {
                result.operation_blocks.push(block);
            }
            if lowered.contains(API_KEYWORD) {
                result.api_blocks.push(block);
            }
            if lowered.contains(TAG_KEYWORD) {
                result.tag_blocks.push(block);
            }
        }

        debug!(
            "Detected {} API, {} operation and {} tag blocks",
            result.api_blocks.len(),
            result.operation_blocks.len(),
            result.tag_blocks.len()
        );
        result
    }
}
