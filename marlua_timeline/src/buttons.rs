use std::{error::Error, fmt, str::FromStr};

use bitflags::bitflags;

bitflags! {
    /// A set of buttons, laid out as the byte the NES controller port shifts out.
    pub struct Buttons: u8 {
        const A      = 1 << 0;
        const B      = 1 << 1;
        const SELECT = 1 << 2;
        const START  = 1 << 3;
        const UP     = 1 << 4;
        const DOWN   = 1 << 5;
        const LEFT   = 1 << 6;
        const RIGHT  = 1 << 7;
    }
}

/// A single controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Button {
    /// A, also known as JUMP.
    A,
    /// B, also known as RUN.
    B,
    /// Select.
    Select,
    /// Start.
    Start,
    /// D-pad up.
    Up,
    /// D-pad down.
    Down,
    /// D-pad left.
    Left,
    /// D-pad right.
    Right,
}

impl Button {
    /// Return all buttons in port bit order.
    pub fn all() -> &'static [Button] {
        &[
            Self::A,
            Self::B,
            Self::Select,
            Self::Start,
            Self::Up,
            Self::Down,
            Self::Left,
            Self::Right,
        ]
    }

    /// The port bit for this button.
    pub fn flag(self) -> Buttons {
        match self {
            Button::A => Buttons::A,
            Button::B => Buttons::B,
            Button::Select => Buttons::SELECT,
            Button::Start => Buttons::START,
            Button::Up => Buttons::UP,
            Button::Down => Buttons::DOWN,
            Button::Left => Buttons::LEFT,
            Button::Right => Buttons::RIGHT,
        }
    }

    /// The canonical name of the button.
    pub fn name(self) -> &'static str {
        match self {
            Button::A => "A",
            Button::B => "B",
            Button::Select => "SELECT",
            Button::Start => "START",
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
        }
    }

    /// The d-pad direction on the same axis, if this is a direction.
    pub fn opposite(self) -> Option<Button> {
        match self {
            Button::Up => Some(Button::Down),
            Button::Down => Some(Button::Up),
            Button::Left => Some(Button::Right),
            Button::Right => Some(Button::Left),
            _ => None,
        }
    }

    /// Look up a button by name, ignoring case.
    ///
    /// Besides the canonical names, `JUMP`, `RUN`, `U`, `D`, `L` and `R` are accepted.
    pub fn from_name(name: &str) -> Result<Self, UnknownButton> {
        let button = match name.to_ascii_uppercase().as_str() {
            "A" | "JUMP" => Button::A,
            "B" | "RUN" => Button::B,
            "SELECT" => Button::Select,
            "START" => Button::Start,
            "U" | "UP" => Button::Up,
            "D" | "DOWN" => Button::Down,
            "L" | "LEFT" => Button::Left,
            "R" | "RIGHT" => Button::Right,
            _ => return Err(UnknownButton(name.to_owned())),
        };
        Ok(button)
    }
}

impl FromStr for Button {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<Button> for Buttons {
    fn from(v: Button) -> Self {
        v.flag()
    }
}

impl Buttons {
    /// Resolve every name independently and combine the results.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, UnknownButton> {
        names
            .into_iter()
            .try_fold(Buttons::empty(), |buttons, name| {
                Ok(buttons | Button::from_name(name)?.flag())
            })
    }

    /// Iterate over the buttons in the set, in port bit order.
    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::all()
            .iter()
            .copied()
            .filter(move |button| self.contains(button.flag()))
    }

    /// Remove both directions of any d-pad axis on which both directions are set.
    pub fn cancel_opposites(self) -> Self {
        self.iter()
            .filter(|button| {
                button
                    .opposite()
                    .map_or(true, |opposite| !self.contains(opposite.flag()))
            })
            .fold(Buttons::empty(), |buttons, button| buttons | button.flag())
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let names: Vec<&str> = self.iter().map(Button::name).collect();
        write!(f, "{}", names.join("+"))
    }
}

/// A button name that doesn't match any known button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownButton(pub String);

impl fmt::Display for UnknownButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown button: {:?}", self.0)
    }
}

impl Error for UnknownButton {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_names_and_aliases() {
        assert_eq!(Button::from_name("a"), Ok(Button::A));
        assert_eq!(Button::from_name("Jump"), Ok(Button::A));
        assert_eq!(Button::from_name("RUN"), Ok(Button::B));
        assert_eq!("r".parse::<Button>(), Ok(Button::Right));
        assert_eq!(
            Button::from_name("turbo"),
            Err(UnknownButton("turbo".to_owned()))
        );
    }

    #[test]
    fn test_port_byte_layout() {
        assert_eq!(Buttons::A.bits(), 0b0000_0001);
        assert_eq!(Buttons::START.bits(), 0b0000_1000);
        assert_eq!((Buttons::RIGHT | Buttons::B).bits(), 0b1000_0010);
    }

    #[test]
    fn test_from_names() {
        assert_eq!(
            Buttons::from_names(["right", "b"]),
            Ok(Buttons::RIGHT | Buttons::B)
        );
        assert!(Buttons::from_names(["a", "x"]).is_err());
        assert_eq!(Buttons::from_names([]), Ok(Buttons::empty()));
    }

    #[test]
    fn test_cancel_opposites() {
        let buttons = Buttons::LEFT | Buttons::RIGHT | Buttons::UP | Buttons::A;
        assert_eq!(buttons.cancel_opposites(), Buttons::UP | Buttons::A);
        assert_eq!(Button::Up.opposite(), Some(Button::Down));
        assert_eq!(Button::A.opposite(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!((Buttons::A | Buttons::RIGHT).to_string(), "A+RIGHT");
        assert_eq!(Buttons::empty().to_string(), "-");
    }
}
