use std::io::{self, Write};

use crate::checks::{CheckReport, Marker};

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
	pub passed: usize,
	pub total: usize,
}

impl Summary {
	pub fn from_reports(reports: &[CheckReport]) -> Self {
		Self { passed: reports.iter().filter(|r| r.passed).count(), total: reports.len() }
	}

	pub fn all_passed(&self) -> bool {
		self.passed == self.total
	}

	pub fn exit_code(&self) -> i32 {
		if self.all_passed() { 0 } else { 1 }
	}
}

fn rule() -> String {
	"=".repeat(RULE_WIDTH)
}

pub fn write_banner(out: &mut impl Write, title: &str) -> io::Result<()> {
	writeln!(out, "{}", rule())?;
	writeln!(out, "  {}", title)?;
	writeln!(out, "{}", rule())
}

/// One check's section: numbered header then its marked lines.
pub fn write_check(out: &mut impl Write, index: usize, report: &CheckReport) -> io::Result<()> {
	writeln!(out)?;
	writeln!(out, "=== 测试{}: {} ===", index, report.kind.title())?;
	for (marker, line) in &report.lines {
		match marker {
			Marker::Ok => writeln!(out, "✅ {}", line)?,
			Marker::Warn => writeln!(out, "⚠️  {}", line)?,
			Marker::Fail => writeln!(out, "❌ {}", line)?,
			Marker::Detail => writeln!(out, "   - {}", line)?,
		}
	}
	Ok(())
}

pub fn write_summary(out: &mut impl Write, reports: &[CheckReport], frontend_url: Option<&str>) -> io::Result<Summary> {
	let summary = Summary::from_reports(reports);
	writeln!(out)?;
	write_banner(out, "测试结果汇总")?;
	for r in reports {
		let status = if r.passed { "✅ 通过" } else { "❌ 失败" };
		writeln!(out, "{} - {}", status, r.kind.name())?;
	}
	writeln!(out)?;
	writeln!(out, "总计: {}/{} 项通过", summary.passed, summary.total)?;
	if summary.all_passed() {
		writeln!(out)?;
		writeln!(out, "🎉 所有后端测试通过！")?;
		if let Some(url) = frontend_url {
			writeln!(out)?;
			writeln!(out, "下一步: 使用浏览器进行前端功能测试")?;
			writeln!(out, "测试URL: {}", url)?;
		}
	} else {
		writeln!(out)?;
		writeln!(out, "⚠️  部分测试失败，请检查Supabase配置")?;
	}
	Ok(summary)
}

/// Writes every section and the summary; returns the tally.
pub fn write_all(out: &mut impl Write, reports: &[CheckReport], frontend_url: Option<&str>) -> io::Result<Summary> {
	for (i, r) in reports.iter().enumerate() {
		write_check(out, i + 1, r)?;
	}
	write_summary(out, reports, frontend_url)
}
