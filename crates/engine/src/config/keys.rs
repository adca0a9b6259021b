use winit::keyboard::KeyCode;

const LETTER_KEYS: [KeyCode; 26] = [
    KeyCode::KeyA,
    KeyCode::KeyB,
    KeyCode::KeyC,
    KeyCode::KeyD,
    KeyCode::KeyE,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::KeyH,
    KeyCode::KeyI,
    KeyCode::KeyJ,
    KeyCode::KeyK,
    KeyCode::KeyL,
    KeyCode::KeyM,
    KeyCode::KeyN,
    KeyCode::KeyO,
    KeyCode::KeyP,
    KeyCode::KeyQ,
    KeyCode::KeyR,
    KeyCode::KeyS,
    KeyCode::KeyT,
    KeyCode::KeyU,
    KeyCode::KeyV,
    KeyCode::KeyW,
    KeyCode::KeyX,
    KeyCode::KeyY,
    KeyCode::KeyZ,
];

const DIGIT_KEYS: [KeyCode; 10] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1,
    KeyCode::F2,
    KeyCode::F3,
    KeyCode::F4,
    KeyCode::F5,
    KeyCode::F6,
    KeyCode::F7,
    KeyCode::F8,
    KeyCode::F9,
    KeyCode::F10,
    KeyCode::F11,
    KeyCode::F12,
];

/// Accepts winit `KeyCode` names (`KeyA`, `Digit1`, `F5`, `Escape`) and the
/// short lowercase aliases used in hand-written binding files (`a`, `1`,
/// `esc`, `=`).
pub(crate) fn key_code_from_name(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    if let Some(letter) = name.strip_prefix("Key") {
        return single_char(letter).and_then(letter_key);
    }
    if let Some(digit) = name.strip_prefix("Digit") {
        return single_char(digit).and_then(digit_key);
    }
    if let Some(key) = function_key(name) {
        return Some(key);
    }
    if let Some(ch) = single_char(name) {
        if let Some(key) = letter_key(ch).or_else(|| digit_key(ch)) {
            return Some(key);
        }
    }

    let key = match name.to_ascii_lowercase().as_str() {
        "escape" | "esc" => KeyCode::Escape,
        "space" => KeyCode::Space,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "arrowup" | "up" => KeyCode::ArrowUp,
        "arrowdown" | "down" => KeyCode::ArrowDown,
        "arrowleft" | "left" => KeyCode::ArrowLeft,
        "arrowright" | "right" => KeyCode::ArrowRight,
        "minus" | "-" => KeyCode::Minus,
        "equal" | "=" => KeyCode::Equal,
        "bracketleft" | "[" => KeyCode::BracketLeft,
        "bracketright" | "]" => KeyCode::BracketRight,
        "comma" | "," => KeyCode::Comma,
        "period" | "." => KeyCode::Period,
        "slash" | "/" => KeyCode::Slash,
        "backslash" | "\\" => KeyCode::Backslash,
        "semicolon" | ";" => KeyCode::Semicolon,
        "quote" | "'" => KeyCode::Quote,
        "backquote" | "`" => KeyCode::Backquote,
        "shiftleft" | "shift" => KeyCode::ShiftLeft,
        "shiftright" => KeyCode::ShiftRight,
        "controlleft" | "ctrl" => KeyCode::ControlLeft,
        "controlright" => KeyCode::ControlRight,
        "numpadadd" => KeyCode::NumpadAdd,
        "numpadsubtract" => KeyCode::NumpadSubtract,
        _ => return None,
    };
    Some(key)
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

fn letter_key(ch: char) -> Option<KeyCode> {
    let ch = ch.to_ascii_lowercase();
    if !ch.is_ascii_lowercase() {
        return None;
    }
    LETTER_KEYS.get((ch as u8 - b'a') as usize).copied()
}

fn digit_key(ch: char) -> Option<KeyCode> {
    ch.to_digit(10)
        .and_then(|digit| DIGIT_KEYS.get(digit as usize).copied())
}

fn function_key(name: &str) -> Option<KeyCode> {
    let number = name
        .strip_prefix('F')
        .or_else(|| name.strip_prefix('f'))?
        .parse::<usize>()
        .ok()?;
    number
        .checked_sub(1)
        .and_then(|index| FUNCTION_KEYS.get(index).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winit_names_resolve() {
        assert_eq!(key_code_from_name("KeyW"), Some(KeyCode::KeyW));
        assert_eq!(key_code_from_name("Digit2"), Some(KeyCode::Digit2));
        assert_eq!(key_code_from_name("F12"), Some(KeyCode::F12));
        assert_eq!(key_code_from_name("Escape"), Some(KeyCode::Escape));
        assert_eq!(key_code_from_name("ArrowLeft"), Some(KeyCode::ArrowLeft));
        assert_eq!(key_code_from_name("Equal"), Some(KeyCode::Equal));
    }

    #[test]
    fn short_aliases_resolve() {
        assert_eq!(key_code_from_name("z"), Some(KeyCode::KeyZ));
        assert_eq!(key_code_from_name("Z"), Some(KeyCode::KeyZ));
        assert_eq!(key_code_from_name("1"), Some(KeyCode::Digit1));
        assert_eq!(key_code_from_name("esc"), Some(KeyCode::Escape));
        assert_eq!(key_code_from_name("="), Some(KeyCode::Equal));
        assert_eq!(key_code_from_name("-"), Some(KeyCode::Minus));
        assert_eq!(key_code_from_name("up"), Some(KeyCode::ArrowUp));
        assert_eq!(key_code_from_name("f5"), Some(KeyCode::F5));
    }

    #[test]
    fn unknown_names_are_rejected() {
        for name in ["", "KeyAA", "Digit10", "F0", "F13", "hyper", "é"] {
            assert_eq!(key_code_from_name(name), None, "name={name}");
        }
    }
}
