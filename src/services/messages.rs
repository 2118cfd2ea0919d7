//! User-facing messages
//!
//! The client speaks Hungarian; every text shown to the user lives here.

// ============================================================================
// Input validation
// ============================================================================

pub const REQUIRED: &str = "Kötelező mező";
pub const INVALID_EMAIL: &str = "Érvénytelen email cím";
pub const PASSWORD_TOO_SHORT: &str = "A jelszónak legalább 8 karakter hosszúnak kell lennie";
pub const PASSWORD_NEEDS_DIGIT: &str = "A jelszónak tartalmaznia kell legalább egy számot";
pub const PASSWORD_NEEDS_LOWERCASE: &str = "A jelszónak tartalmaznia kell legalább egy kisbetűt";
pub const PASSWORDS_MUST_MATCH: &str = "A jelszavaknak meg kell egyezniük";
pub const NEW_PASSWORD_SAME_AS_OLD: &str = "Az új jelszó nem egyezhet meg a régi jelszóval";
pub const PASSWORD_CONFIRM_MISMATCH: &str = "A két jelszó nem egyezik meg";
pub const FORUM_FIELDS_REQUIRED: &str = "Minden mezőt ki kell tölteni.";
pub const FORUM_TITLE_TOO_LONG: &str = "A cím legfeljebb 100 karakter hosszú lehet.";
pub const FORUM_DESCRIPTION_TOO_LONG: &str = "A leírás legfeljebb 250 karakter hosszú lehet.";
pub const COMMENT_EMPTY: &str = "A hozzászólás nem lehet üres.";
pub const COMMENT_TOO_LONG: &str = "A hozzászólás legfeljebb 250 karakter hosszú lehet.";

// ============================================================================
// Backend failures
// ============================================================================

pub const INVALID_INPUT: &str = "A bevitt adatok érvénytelenek.";
pub const WRONG_CREDENTIALS: &str = "Hibás felhasználónév vagy jelszó.";
pub const USER_EXISTS: &str = "A felhasználó már létezik.";
pub const SAME_PASSWORD: &str = "A régi és az új jelszó azonos.";
pub const INVALID_TOKEN: &str = "Hiányzó vagy érvénytelen token.";
pub const UNKNOWN_ERROR: &str = "Ismeretlen hiba történt.";
pub const UNAVAILABLE: &str = "A szerver nem elérhető.";
pub const PROFILE_LOAD_FAILED: &str = "Hiba történt az adatok lekérése során.";
pub const FORUMS_LOAD_FAILED: &str = "Hiba történt a fórumok betöltése során.";
pub const FORUM_EXISTS: &str = "Már létezik ilyen című fórum.";
pub const FORUM_UPDATE_FORBIDDEN: &str = "Nincs jogosultságod a fórum módosításához.";
pub const FORUM_DELETE_FORBIDDEN: &str = "Nincs jogosultságod a fórum törléséhez.";
pub const FORUM_NOT_FOUND: &str = "A fórum nem található.";
pub const COMMENT_NOT_FOUND: &str = "A hozzászólás nem található.";

// ============================================================================
// Notifications
// ============================================================================

pub const ERROR_TITLE: &str = "Hiba történt";
pub const REGISTERED: &str = "Sikeres regisztráció!";
pub const PASSWORD_CHANGED: &str = "Jelszó sikeresen megváltoztatva!";
pub const PROFILE_UPDATED: &str = "Adatok sikeresen frissítve!";

pub const FORUM_CREATED: &str = "Fórum létrehozva";
pub const FORUM_UPDATED: &str = "Fórum módosítva";
pub const FORUM_DELETED: &str = "Fórum törölve";
pub const FORUM_DELETED_DETAIL: &str = "A fórum sikeresen törölve lett.";

pub const COMMENT_CREATED: &str = "Hozzászólás létrehozva";
pub const COMMENT_CREATED_DETAIL: &str = "A hozzászólás sikeresen létre lett hozva.";
pub const COMMENT_UPDATED: &str = "Hozzászólás módosítva";
pub const COMMENT_UPDATED_DETAIL: &str = "A hozzászólás sikeresen módosítva lett.";
pub const COMMENT_DELETED: &str = "Hozzászólás törölve";
pub const COMMENT_DELETED_DETAIL: &str = "A hozzászólás sikeresen törölve lett.";

pub fn forum_created_detail(title: &str) -> String {
    format!("A fórum sikeresen létre lett hozva: {}", title)
}

pub fn forum_updated_detail(title: &str) -> String {
    format!("A fórum sikeresen módosítva lett: {}", title)
}
