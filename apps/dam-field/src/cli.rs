//! 命令行定义

use clap::{Args, Parser, Subcommand};
use domain::NewParameter;

#[derive(Debug, Parser)]
#[command(name = "dam-field", version, about = "Dam instrumentation field client")]
pub struct Cli {
    /// 账号邮箱（覆盖 DAM_EMAIL）
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// 账号密码（覆盖 DAM_PASSWORD）
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// 要确认的设施 id 或名称（覆盖 DAM_FACILITY）
    #[arg(long, global = true)]
    pub facility: Option<String>,

    /// 离线使用的设施名；本地命令不再登录
    #[arg(long, global = true)]
    pub dam_name: Option<String>,

    /// 所有确认自动回答“是”
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 列出账号可选设施
    Facilities,
    /// 列出当前设施的仪器模板
    Templates {
        /// 只显示该类型 id 下的模板
        #[arg(long = "type")]
        type_id: Option<String>,
    },
    /// 列出仪器类型
    Types,
    /// 保存一个模板的读数（覆盖之前的保存）
    Record(RecordArgs),
    /// 显示本地待提交读数
    Pending,
    /// 提交全部待提交读数
    Submit,
    /// 删除本地待提交读数
    Clear {
        /// 所有设施
        #[arg(long)]
        all: bool,
    },
    /// 新建仪器模板
    TemplateAdd(TemplateAddArgs),
    /// 从 CSV/XLSX 文件导入模板
    TemplateImport {
        path: std::path::PathBuf,
    },
    /// 例行巡检
    #[command(subcommand)]
    Inspections(InspectionCommand),
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// 模板 id 或自定义名称
    #[arg(long)]
    pub template: String,

    /// 参数读数，NAME=VALUE，可重复
    #[arg(long = "value", value_parser = parse_value_pair)]
    pub values: Vec<(String, String)>,

    #[arg(long, default_value = "")]
    pub notes: String,

    /// 读数日期（YYYY-MM-DD），默认今天
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct TemplateAddArgs {
    /// 仪器类型 id
    #[arg(long = "type")]
    pub type_id: String,

    #[arg(long)]
    pub name: String,

    /// NAME[:ATTENTION[:ALERT]]，可重复
    #[arg(long = "param", value_parser = parse_parameter)]
    pub parameters: Vec<NewParameter>,
}

#[derive(Debug, Subcommand)]
pub enum InspectionCommand {
    /// 列出本地巡检点
    List,
    /// 登记新巡检点
    Register {
        /// 图片路径或 uri
        #[arg(long)]
        image: String,
        #[arg(long)]
        label: String,
    },
    /// 记录巡检状态
    Status {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
        /// unchanged / decreased / increased / new / not-inspected
        status: String,
        /// access / health（仅 not-inspected）
        #[arg(long)]
        reason: Option<String>,
    },
    /// 替换巡检点图片
    Image {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
        image: String,
    },
    /// 删除巡检点
    Delete {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        number: u64,
    },
    /// 清空本地巡检列表
    Clear,
    /// 用服务端巡检点替换本地列表
    Refresh,
    /// 上传本地巡检结果
    Send,
}

fn parse_value_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {}", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in {}", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_parameter(raw: &str) -> Result<NewParameter, String> {
    let mut parts = raw.splitn(3, ':').map(str::trim);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(format!("missing parameter name in {}", raw));
    }
    Ok(NewParameter {
        name: name.to_string(),
        attention_value: parts.next().unwrap_or_default().to_string(),
        alert_value: parts.next().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_collects_repeated_values() {
        let cli = Cli::try_parse_from([
            "dam-field",
            "record",
            "--template",
            "PZ-01",
            "--value",
            "Level=12,5",
            "--value",
            "Pressure = 3",
        ])
        .expect("parse");
        let Command::Record(args) = cli.command else {
            panic!("expected record");
        };
        assert_eq!(
            args.values,
            vec![
                ("Level".to_string(), "12,5".to_string()),
                ("Pressure".to_string(), "3".to_string())
            ]
        );
        assert_eq!(args.date, None);
    }

    #[test]
    fn parameter_thresholds_are_optional() {
        let param = parse_parameter("Level:10,5:12").expect("param");
        assert_eq!(param.attention_value, "10,5");
        assert_eq!(param.alert_value, "12");
        let param = parse_parameter("Flow").expect("param");
        assert_eq!(param.attention_value, "");
        assert!(parse_parameter(":1:2").is_err());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["dam-field", "submit", "--yes", "--dam-name", "North"])
            .expect("parse");
        assert!(cli.yes);
        assert_eq!(cli.dam_name.as_deref(), Some("North"));
    }

    #[test]
    fn inspection_numbers_start_at_one() {
        assert!(Cli::try_parse_from(["dam-field", "inspections", "delete", "0"]).is_err());
        let cli = Cli::try_parse_from(["dam-field", "inspections", "status", "2", "not-inspected", "--reason", "access"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Inspections(InspectionCommand::Status { number: 2, .. })
        ));
    }
}
