//! Fixed reply texts sent to Messenger users.

use crate::cargo::ShipmentRecord;

pub const WELCOME: &str = "Сайн байна уу! Марал Карго руу тавтай морилно уу. Та \"бараа шалгах\" гэж бичээд ачааг шалгах боломжтой.";
pub const TRACKING_PROMPT: &str = "Та барааны дугаараа оруулна уу";
pub const ADDRESS: &str = "📍 Хаяг:\nЭрдэнэт хот, 4-р микр, 8-р байр";
pub const CONTACT: &str = "☎️ Холбогдох утас:\n99611133";
pub const ORIGIN: &str = "🚚 Бид Хятадаас бараа татдаг.\n📦 Эрдэнэт хотруу ачаа тээвэрлэдэг.";
pub const INFO: &str = "📦 Марал Карго\n🚚 Хятадаас бараа татдаг\n📍 Эрдэнэт хотруу тээвэрлэдэг\n☎️ Утас: 99611133";
pub const NOT_FOUND: &str = "Уучлаарай, ийм бараа олдсонгүй";
pub const FALLBACK: &str = "Уучлаарай, би таныг ойлгосонгүй. Та \"бараа шалгах\" эсвэл \"хаяг\" гэх мэт командыг ашиглана уу.";

/// Lookup answer listing the current shipment fields.
pub fn shipment_details(record: &ShipmentRecord) -> String {
    format!(
        "📦 Барааны дугаар: {}\n📍 Байршил: {}\n🚚 Төлөв: {}\n📅 Ирэх хугацаа: {}",
        record.goods_id, record.location, record.status, record.estimated_arrival
    )
}

/// Notice pushed to subscribers after an operator moves a shipment.
pub fn change_notice(record: &ShipmentRecord) -> String {
    format!(
        "Таны бараа {} - шинэ байршил: {}, төлөв: {}",
        record.goods_id, record.location, record.status
    )
}
