// ==========================================
// 自动化模板目录系统 - 行操作分类器实现
// ==========================================
// 职责: 读取 action 单元格，判定 upsert / delete
// ==========================================

use crate::domain::types::RowAction;
use crate::importer::template_importer_trait::ActionClassifier as ActionClassifierTrait;

pub struct ActionClassifier;

impl ActionClassifierTrait for ActionClassifier {
    /// 去空白并转小写后匹配；任何其他值（含空）返回携带原文的拒绝消息
    fn classify(&self, raw: &str) -> Result<RowAction, String> {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "upsert" => Ok(RowAction::Upsert),
            "delete" => Ok(RowAction::Delete),
            _ => Err(format!(
                "无效的 action 值: '{}'（仅支持 upsert / delete）",
                trimmed
            )),
        }
    }
}
