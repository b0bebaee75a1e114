//! Outbound message texts.
//!
//! Everything the user reads comes from here. The formatting uses WhatsApp's
//! lightweight markup: `*bold*` and `_italic_`.

use crate::model::{OrderId, OrderItem, PendingItems, StatusReport, StatusSnapshot};
use std::fmt::Write;
use std::time::Duration;

pub const HELP: &str = "🤖 Sipariş Takip Asistanı'na hoş geldiniz.
Takip etmek için sipariş numaranızı gönderebilirsiniz.

📝 *Kullanılabilir Komutlar:*
➡️ *start, merhaba, başlat*: Bu yardım mesajını gösterir.
➡️ *listele, liste, sırala*: Aktif olarak takip edilen tüm siparişleri listeler.
➡️ *durum, bilgi*: Takipteki tüm siparişlerin beklemedeki ürünlerini gösterir.
➡️ *[sipariş no] durum*: Belirli bir siparişin beklemedeki ürünlerini gösterir.
➡️ *[sipariş no] iptal*: Belirli bir siparişin takibini sonlandırır.
➡️ *stop, hoşçakal, bitir*: Tüm sipariş takiplerini sonlandırır.";

pub const UNKNOWN_COMMAND: &str = "Üzgünüm, bu komutu anlayamadım. 🧐\n\
     Kullanabileceğim komutları görmek için 'merhaba' yazabilirsiniz.";

pub const STOPPED_ALL: &str = "Tüm aktif sipariş takipleri sonlandırıldı. 🛑";

pub const NOTHING_TRACKED: &str = "Takip edilen aktif bir sipariş bulunmuyor. 🗒️";

pub const SERVICE_UNAVAILABLE: &str = "Şu anda isteğinizi işleyemiyoruz. Lütfen daha sonra tekrar deneyin.";

// --- tracker notifications ---

pub fn tracking_started(order: &OrderId, snapshot: &StatusSnapshot) -> String {
    let mut text = format!("Siparişiniz takibe alındı: {} 🎯\n\n*Mevcut Durum:*", order);
    for (product, status) in snapshot.iter() {
        let _ = write!(text, "\n- {}: _{}_", product, status);
    }
    text
}

pub fn order_not_found(order: &OrderId) -> String {
    format!(
        "Sipariş bulunamadı: {} 💬\nLütfen numarayı kontrol edip tekrar deneyin.",
        order
    )
}

pub fn already_complete(order: &OrderId) -> String {
    format!("Bu sipariş zaten tamamlanmış görünüyor: {} ✅", order)
}

pub fn item_ready(order: &OrderId, product: &str) -> String {
    format!(
        "✅ ÜRÜN HAZIR ✅| Sipariş: {}\n\n- *{}* adlı ürününüzü teslim alabilirsiniz.",
        order, product
    )
}

pub fn order_complete(order: &OrderId) -> String {
    format!(
        "🎉 SİPARİŞİNİZ TAMAMLANDI 🎉| No: {}\n\nTüm ürünleriniz teslim alınmaya hazır. Afiyet olsun!",
        order
    )
}

// --- command replies ---

pub fn already_tracking(order: &OrderId) -> String {
    format!("Bu sipariş zaten takip listemde: {} 👍", order)
}

pub fn cooldown(remaining: Duration) -> String {
    format!(
        "Çok hızlı komut gönderdiniz. Lütfen {:.1} saniye sonra tekrar deneyin.",
        remaining.as_secs_f64()
    )
}

pub fn tracking_cancelled(order: &OrderId) -> String {
    format!("Sipariş takibi iptal edildi: {} ❌", order)
}

pub fn not_tracked(order: &OrderId) -> String {
    format!("{} numaralı sipariş zaten takip edilmiyor. 🤔", order)
}

pub fn tracked_list(orders: &[OrderId]) -> String {
    if orders.is_empty() {
        return NOTHING_TRACKED.to_string();
    }
    let mut text = String::from("📋 Aktif Takipteki Siparişleriniz:");
    for order in orders {
        let _ = write!(text, "\n- {}", order);
    }
    text
}

pub fn status_report(report: &StatusReport) -> String {
    match report {
        StatusReport::NothingTracked => {
            "Durumu kontrol edilecek aktif bir sipariş takibi bulunmamaktadır.".to_string()
        }
        StatusReport::Unavailable(order) => {
            format!("{} numaralı sipariş için durum bilgisi alınamadı.", order)
        }
        StatusReport::Order(PendingItems { order, items }) if items.is_empty() => {
            format!("Siparişinizde bekleyen ürün bulunmamaktadır: {} ✅", order)
        }
        StatusReport::Order(PendingItems { order, items }) => {
            let mut text = format!("*Sipariş {} | Beklemedeki Ürünler:*", order);
            push_items(&mut text, items);
            text
        }
        StatusReport::Tracked(orders) => {
            let mut text = String::from("⏳ Beklemedeki Ürünleriniz:");
            let mut any = false;
            for pending in orders.iter().filter(|p| !p.items.is_empty()) {
                any = true;
                let _ = write!(text, "\n\n*Sipariş: {}*", pending.order);
                push_items(&mut text, &pending.items);
            }
            if any {
                text
            } else {
                "Harika haber! Takip ettiğiniz siparişlerde beklemede olan ürün bulunmamaktadır. ✅"
                    .to_string()
            }
        }
    }
}

fn push_items(text: &mut String, items: &[OrderItem]) {
    for item in items {
        let _ = write!(text, "\n- {}: _{}_", item.product, item.status);
    }
}
