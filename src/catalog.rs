//! The age-friendly community indicator rubric.
//!
//! The catalog is built once on first use and never modified afterwards.
//! Every assessment works on its own deep copy obtained from
//! [`clone_catalog`], so no two assessments share indicator values.

use crate::error::{ScoringError, ScoringResult};
use crate::models::{Category, Indicator};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Tolerance used when checking that category weights add up to one.
const WEIGHT_EPSILON: f64 = 1e-9;

static CATALOG: LazyLock<Vec<Category>> = LazyLock::new(build_catalog);

/// Returns a deep copy of the rubric with every value unset.
pub fn clone_catalog() -> Vec<Category> {
    CATALOG.clone()
}

/// Read-only view of the shared rubric.
pub fn catalog() -> &'static [Category] {
    &CATALOG
}

/// Checks the structural invariants every scoring operation relies on.
pub fn validate_categories(categories: &[Category]) -> ScoringResult<()> {
    let mut seen = HashSet::new();
    let mut sum = 0.0;

    for category in categories {
        if !seen.insert(category.code.as_str()) {
            return Err(ScoringError::DuplicateCategory {
                code: category.code.clone(),
            });
        }

        if category.indicators.is_empty() {
            return Err(ScoringError::EmptyCategory {
                code: category.code.clone(),
            });
        }

        if !(category.weight > 0.0 && category.weight <= 1.0) {
            return Err(ScoringError::InvalidWeight {
                code: category.code.clone(),
                weight: category.weight,
            });
        }

        let mut codes = HashSet::new();
        for indicator in &category.indicators {
            if !codes.insert(indicator.code.as_str()) {
                return Err(ScoringError::DuplicateIndicator {
                    category: category.code.clone(),
                    indicator: indicator.code.clone(),
                });
            }
        }

        sum += category.weight;
    }

    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(ScoringError::WeightSum { sum });
    }

    Ok(())
}

fn category(code: &str, name: &str, indicators: &[(&str, &str, &str)]) -> Category {
    Category {
        code: code.to_string(),
        name: name.to_string(),
        weight: 0.125,
        indicators: indicators
            .iter()
            .map(|(code, name, unit)| Indicator::new(code, name, unit))
            .collect(),
        score: None,
    }
}

fn build_catalog() -> Vec<Category> {
    vec![
        category(
            "A",
            "公共空间环境安全性",
            &[
                // A1 社区户外空间
                ("A11", "老年友好休闲空间设计", "分"),
                ("A12", "公共空间遮阴覆盖率", "%"),
                ("A13", "老年人专用停车位比例", "%"),
                ("A14", "户外空间应急功能适应性", "分"),
                // A2 住宅公共环境
                ("A21", "电梯紧急呼叫系统覆盖率", "%"),
                ("A22", "住宅公共空间防滑地面覆盖率", "%"),
                ("A23", "公共空间室内空气质量", "分"),
            ],
        ),
        category(
            "B",
            "老年友好设施建设",
            &[
                ("B11", "公共厕所老年友好设施完备性", "分"),
                ("B12", "老年友好休憩设施覆盖率", "%"),
                ("B13", "老年友好照明设施覆盖率", "%"),
                ("B14", "老年友好设施15分钟步行覆盖率", "%"),
            ],
        ),
        category(
            "C",
            "交通与出行",
            &[
                ("C11", "轮椅通行走廊宽度达标率", "%"),
                ("C12", "路面及排水标准达标率", "%"),
                ("C13", "社区主要道路人车分离比例", "%"),
                ("C14", "公交站点老年友好设施覆盖率", "%"),
                ("C15", "夜间人行道照明标准达标率", "%"),
                ("C16", "社区应急出口老年人无障碍性和便利性", "分"),
            ],
        ),
        category(
            "D",
            "健康服务",
            &[
                ("D11", "居家养老服务覆盖率", "%"),
                ("D12", "基层医疗服务满意率", "%"),
                ("D13", "家庭医生签约率", "%"),
                ("D14", "健康档案和慢病管理覆盖率", "%"),
                ("D21", "每千名老年人心理健康咨询师比例", "‰"),
                ("D22", "年度心理筛查参与率", "%"),
            ],
        ),
        category(
            "E",
            "应急响应",
            &[
                ("E11", "应急救援设施覆盖率", "%"),
                ("E12", "综合应急物资储备达标率", "%"),
                ("E21", "应急志愿服务参与率", "%"),
                ("E22", "社区应急演练频次", "次/年"),
                ("E23", "关键应急响应预案要素完备率", "%"),
                ("E24", "应急车辆平均响应时间", "分钟"),
            ],
        ),
        category(
            "F",
            "社区支持网络",
            &[
                ("F11", "志愿者助老服务覆盖率", "%"),
                ("F12", "老年人就业培训参与率", "%"),
                ("F13", "老年人数字技能培训年度频次", "次/年"),
                ("F14", "传统线下服务窗口保留率", "%"),
                ("F21", "失能老年人一对一帮扶比例", "%"),
                ("F22", "独居老年人访问频次", "次/月"),
                ("F23", "邻里互助网络活跃度", "分"),
            ],
        ),
        category(
            "G",
            "社区文化与组织",
            &[
                ("G11", "活动信息传播渠道多样性", "分"),
                ("G12", "活动安排对老年人的适宜性", "分"),
                ("G21", "普惠性老年导向活动频次", "次/月"),
                ("G22", "敬老文化推广活动覆盖率", "%"),
                ("G23", "代际互动活动频次", "次/月"),
            ],
        ),
        category(
            "H",
            "智慧社区发展",
            &[
                ("H11", "政务服务老年友好化改造率", "%"),
                ("H12", "老年友好公共信息达标率", "%"),
                ("H21", "线上社区养老服务利用率", "%"),
                ("H22", "老年人智能健康监测设备使用率", "%"),
                ("H23", "智能安防系统覆盖率及运行效果", "分"),
                ("H24", "AI跌倒检测系统覆盖率", "%"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let categories = clone_catalog();
        let codes: Vec<_> = categories.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C", "D", "E", "F", "G", "H"]);
        assert_eq!(categories[0].indicators.len(), 7);

        let total: usize = categories.iter().map(|c| c.indicators.len()).sum();
        assert_eq!(total, 47);
    }

    #[test]
    fn test_catalog_starts_unset() {
        for category in clone_catalog() {
            assert!(category.score.is_none());
            assert!(category.indicators.iter().all(|i| i.value.is_none()));
        }
    }

    #[test]
    fn test_catalog_is_valid() {
        assert_eq!(validate_categories(catalog()), Ok(()));
    }

    #[test]
    fn test_clones_do_not_alias() {
        let mut first = clone_catalog();
        let second = clone_catalog();

        first[0].indicators[0].value = Some(42.0);

        assert_eq!(second[0].indicators[0].value, None);
        assert_eq!(catalog()[0].indicators[0].value, None);
    }

    #[test]
    fn test_rejects_empty_category() {
        let mut categories = clone_catalog();
        categories[2].indicators.clear();

        assert_eq!(
            validate_categories(&categories),
            Err(ScoringError::EmptyCategory {
                code: "C".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_bad_weights() {
        let mut categories = clone_catalog();
        categories[0].weight = 0.25;
        assert!(matches!(
            validate_categories(&categories),
            Err(ScoringError::WeightSum { .. })
        ));

        categories[0].weight = 0.0;
        assert!(matches!(
            validate_categories(&categories),
            Err(ScoringError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_codes() {
        let mut categories = clone_catalog();
        categories[1].code = "A".to_string();
        assert!(matches!(
            validate_categories(&categories),
            Err(ScoringError::DuplicateCategory { .. })
        ));

        let mut categories = clone_catalog();
        categories[0].indicators[1].code = "A11".to_string();
        assert!(matches!(
            validate_categories(&categories),
            Err(ScoringError::DuplicateIndicator { .. })
        ));
    }
}
