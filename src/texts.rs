//! Operator-locale (Persian) notice texts.
//!
//! All user-visible strings live here so the notice wording stays in one
//! place. Mentions are HTML links to `tg://user?id=...`; display names are
//! escaped before interpolation.

use crate::transport::{ChatId, UserId};

/// Approve decision token the approver replies with.
pub const APPROVE_TOKEN: &str = "تایید";
/// Reject decision token.
pub const REJECT_TOKEN: &str = "رد";

/// Violation reason: link sharing.
pub const REASON_LINK: &str = "ارسال لینک";
/// Violation reason: banned word.
pub const REASON_BANNED_WORD: &str = "ارسال کلمات نامناسب";
/// Violation reason: manual warning by an admin.
pub const REASON_MANUAL: &str = "تخلف از قوانین گروه";

pub const REPLY_REQUIRED: &str = "⚠️ لطفاً به پیام کاربر پاسخ دهید.";
pub const UNMUTE_USAGE: &str = "⚠️ لطفا ریپلای کنید یا آیدی/نام کاربری وارد کنید.";
pub const ADDWORD_USAGE: &str = "⚠️ لطفا کلمه را وارد کنید.";

pub const APPROVAL_NOT_FOUND: &str = "⚠️ پیام یافت نشد.";
pub const APPROVAL_SENT_ACK: &str = "✅ ارسال شد.";
pub const APPROVAL_REJECTED_ACK: &str = "❌ رد شد.";
pub const APPROVED_CAPTION: &str = "✅ <b>تایید شد</b>\nتوسط مدیر گروه.";

pub const BAN_FAILED: &str = "❌ خطا در بن کردن کاربر.";
pub const UNMUTE_FAILED: &str = "❌ خطا در برداشتن محدودیت.";

pub const CHAT_LICENSED: &str = "✅ این گروه با موفقیت فعال شد.";
pub const CHAT_ALREADY_LICENSED: &str = "⚠️ این گروه قبلاً فعال شده است.";

/// Escape the HTML-sensitive characters of a display name.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML mention of a user by display name.
pub fn mention(user: UserId, display_name: &str) -> String {
    format!(
        "<a href=\"tg://user?id={user}\">{}</a>",
        escape_html(display_name)
    )
}

/// Warning notice below the suspension threshold.
pub fn warning(mention: &str, reason: &str, count: u32, limit: u32) -> String {
    format!("🚫 {mention} عزیز، {reason} مجاز نیست.\n⚠️ اخطار: {count}/{limit}")
}

/// Notice for a successful suspension at the threshold.
pub fn suspended(mention: &str, reason: &str) -> String {
    format!("🚫 کاربر {mention} به دلیل {reason} و دریافت ۳ اخطار مسدود شد!")
}

/// Degraded notice when the suspension attempt failed.
pub fn suspension_failed(mention: &str) -> String {
    format!("🚫 اخطار سوم برای {mention} (ربات دسترسی بن ندارد).")
}

/// Group notice after media is quarantined for review.
pub fn sent_for_review(mention: &str) -> String {
    format!("🔒 {mention} عزیز، فایل شما برای بررسی ارسال شد.")
}

/// Prompt sent to the approver alongside forwarded media.
pub fn approval_prompt(mention: &str, chat_title: &str) -> String {
    format!(
        "📩 <b>مدیا برای تایید</b>\nکاربر: {mention}\nگروه: {}\n\n✅ {APPROVE_TOKEN} / ❌ {REJECT_TOKEN}",
        escape_html(chat_title)
    )
}

/// Rejection notice sent to the origin chat.
pub fn media_rejected(mention: &str) -> String {
    format!("❌ مدیا ارسالی توسط {mention} تایید نشد.")
}

/// Successful ban notice (`/ban`).
pub fn banned(mention: &str) -> String {
    format!("🚫 کاربر {mention} از گروه اخراج شد.")
}

/// Successful unmute notice (`/unmute`).
pub fn unmuted(name: &str) -> String {
    format!("✅ محدودیت‌های {name} برداشته شد.")
}

/// Unknown username for `/unmute`.
pub fn user_not_found(arg: &str) -> String {
    format!("❌ کاربر {} یافت نشد.", escape_html(arg))
}

/// `/addword` result notices.
pub fn word_added(word: &str) -> String {
    format!("✅ کلمه '{}' اضافه شد.", escape_html(word))
}

pub fn word_exists(word: &str) -> String {
    format!("⚠️ کلمه '{}' قبلاً وجود داشت.", escape_html(word))
}

/// One-time explanation sent to an unlicensed group before leaving.
/// Includes the chat id the operator needs for manual licensing.
pub fn unlicensed(chat: ChatId) -> String {
    format!(
        "⛔️ این گروه مجوز استفاده از ربات را ندارد.\n🆔 شناسه گروه: <code>{chat}</code>\nبرای فعال‌سازی، این شناسه را برای پشتیبانی ارسال کنید."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_in_names() {
        assert_eq!(escape_html("<b>x&y</b>"), "&lt;b&gt;x&amp;y&lt;/b&gt;");
    }

    #[test]
    fn mention_links_user_id() {
        let m = mention(42, "Ali <3");
        assert!(m.contains("tg://user?id=42"));
        assert!(m.contains("Ali &lt;3"));
    }

    #[test]
    fn warning_shows_count_over_limit() {
        let text = warning("x", REASON_LINK, 1, 3);
        assert!(text.contains("1/3"));
        assert!(text.contains(REASON_LINK));
    }

    #[test]
    fn unlicensed_includes_chat_id() {
        assert!(unlicensed(-1001234).contains("-1001234"));
    }
}
