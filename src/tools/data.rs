//! 数据分析工具：摘要 + 图表结构化数据

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::llm::{GenerativeClient, GEMINI_PRO};

/// 图表类型；未知类型回退为 bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Pie,
    #[serde(other)]
    Bar,
}

/// 单个数据点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataInsight {
    pub label: String,
    pub value: f64,
}

/// 分析结果：洞察摘要 + 图表数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(rename = "chartType")]
    pub chart_type: ChartType,
    #[serde(rename = "chartData")]
    pub chart_data: Vec<DataInsight>,
}

fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "chartType": { "type": "string", "description": "The type of chart: bar, line, or pie" },
            "chartData": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "label": { "type": "string" },
                        "value": { "type": "number" }
                    },
                    "required": ["label", "value"]
                }
            }
        },
        "required": ["summary", "chartType", "chartData"]
    })
}

pub async fn analyze_data(
    client: &dyn GenerativeClient,
    input: &str,
) -> Result<AnalysisResult, AgentError> {
    let prompt = format!(
        "Analyze the following data and provide a summary of key insights \
         and structure it for a chart. Data: {input}"
    );
    let raw = client
        .generate_json(GEMINI_PRO, &prompt, analysis_schema())
        .await
        .map_err(AgentError::LlmError)?;
    serde_json::from_str(&raw).map_err(|e| AgentError::JsonParseError(format!("{e}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_payload_parses() {
        let raw = r#"{
            "summary": "第一季度销量稳步上升。",
            "chartType": "line",
            "chartData": [
                {"label": "一月", "value": 10.0},
                {"label": "二月", "value": 15.5}
            ]
        }"#;
        let result: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.chart_type, ChartType::Line);
        assert_eq!(result.chart_data.len(), 2);
        assert_eq!(result.chart_data[1].value, 15.5);
    }

    #[test]
    fn test_unknown_chart_type_falls_back_to_bar() {
        let raw = r#"{"summary": "s", "chartType": "scatter", "chartData": []}"#;
        let result: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.chart_type, ChartType::Bar);
        // 兜底变体的序列化名不受变体顺序影响
        assert_eq!(
            serde_json::to_value(ChartType::Bar).unwrap(),
            serde_json::json!("bar")
        );
    }
}
