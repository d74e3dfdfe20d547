use marlua_memory::Address;
use marlua_timeline::Buttons;

use crate::{
    script::{check_address, push_jumps},
    Action, Comparison, Condition, ConfigError, RuntimeConfig, Script,
};

pub(crate) fn parse_script(source: &str, config: &RuntimeConfig) -> Result<Script, ConfigError> {
    let mut actions = Vec::new();
    for (index, line) in source.lines().enumerate() {
        parse_line(line, config, &mut actions).map_err(|error| error.at_line(index + 1))?;
    }
    Ok(Script::from_validated(actions))
}

fn parse_line(
    line: &str,
    config: &RuntimeConfig,
    actions: &mut Vec<Action>,
) -> Result<(), ConfigError> {
    let line = strip_comment(line);
    let line: String = line
        .chars()
        .map(|c| match c {
            '(' | ')' | ',' | '"' | '\'' => ' ',
            c => c,
        })
        .collect();

    let mut tokens = line.split_whitespace();
    let command = match tokens.next() {
        Some(command) => command.to_ascii_lowercase(),
        None => return Ok(()),
    };
    let command = command.as_str();
    let args: Vec<&str> = tokens.collect();

    match command {
        "hold" => {
            let (frames, buttons) = match args.split_last() {
                Some((frames, buttons)) if !buttons.is_empty() => (frames, buttons),
                _ => return Err(missing(command, "buttons and a frame count")),
            };
            let buttons = Buttons::from_names(buttons.iter().copied())?;
            let frames = parse_frames(frames)?;
            actions.push(Action::Hold { buttons, frames });
        }
        "press" | "release" | "toggle" => {
            if args.is_empty() {
                return Err(missing(command, "buttons"));
            }
            let buttons = Buttons::from_names(args.iter().copied())?;
            actions.push(match command {
                "press" => Action::Press(buttons),
                "release" => Action::Release(buttons),
                _ => Action::Toggle(buttons),
            });
        }
        "wait" => {
            let [frames] = exact::<1>(command, &args, "a frame count")?;
            actions.push(Action::Wait(parse_frames(frames)?));
        }
        "wait_until" => {
            if args.is_empty() {
                return Err(missing(command, "a condition"));
            }
            let condition = parse_condition(&args.join(" "))?;
            check_address(condition.address, config)?;
            actions.push(Action::WaitUntil(condition));
        }
        "wait_grounded" => {
            exact::<0>(command, &args, "")?;
            actions.push(Action::WaitUntil(config.grounded_condition()));
        }
        "jumps" => {
            let [count, height] = exact::<2>(command, &args, "a jump count and a height")?;
            let count = parse_int(count, "jump count")?;
            let height = parse_frames(height)?;
            push_jumps(actions, count, height, config);
        }
        _ => return Err(ConfigError::UnknownCommand(command.to_owned())),
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    let end = [line.find('#'), line.find("--")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(line.len());
    &line[..end]
}

fn missing(command: &str, argument: &'static str) -> ConfigError {
    ConfigError::MissingArgument {
        command: command.to_owned(),
        argument,
    }
}

/// Require exactly `N` arguments.
fn exact<'a, const N: usize>(
    command: &str,
    args: &[&'a str],
    expected: &'static str,
) -> Result<[&'a str; N], ConfigError> {
    if args.len() > N {
        return Err(ConfigError::UnexpectedArgument {
            command: command.to_owned(),
            argument: args[N].to_owned(),
        });
    }
    <[&str; N]>::try_from(args).map_err(|_| missing(command, expected))
}

fn parse_int(text: &str, expected: &'static str) -> Result<u32, ConfigError> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(hex) = text.strip_prefix('$') {
        u32::from_str_radix(hex, 16)
    } else {
        text.parse::<u32>()
    };
    parsed.map_err(|_| ConfigError::MalformedInteger {
        text: text.to_owned(),
        expected,
    })
}

fn parse_frames(text: &str) -> Result<u32, ConfigError> {
    parse_int(text, "a non-negative frame count")
}

fn parse_u8(text: &str, expected: &'static str) -> Result<u8, ConfigError> {
    let value = parse_int(text, expected)?;
    u8::try_from(value).map_err(|_| ConfigError::MalformedInteger {
        text: text.to_owned(),
        expected,
    })
}

fn parse_address(text: &str) -> Result<Address, ConfigError> {
    let value = parse_int(text, "a 16-bit address")?;
    u16::try_from(value)
        .map(Address)
        .map_err(|_| ConfigError::MalformedInteger {
            text: text.to_owned(),
            expected: "a 16-bit address",
        })
}

/// Parse `[addr] [& mask] op value` or `read addr [& mask] op value`.
fn parse_condition(text: &str) -> Result<Condition, ConfigError> {
    let malformed = || ConfigError::MalformedCondition(text.to_owned());
    let text = text.trim();

    let (address, rest) = if let Some(rest) = text.strip_prefix('[') {
        rest.split_once(']').ok_or_else(malformed)?
    } else if let Some(rest) = text.strip_prefix("read ") {
        let rest = rest.trim_start();
        let end = rest
            .find(|c: char| c.is_whitespace() || "&=!~<>".contains(c))
            .unwrap_or(rest.len());
        rest.split_at(end)
    } else {
        return Err(malformed());
    };
    let address = parse_address(address.trim())?;

    let mut rest = rest.trim_start();
    let mut mask = None;
    if let Some(after) = rest.strip_prefix('&') {
        let after = after.trim_start();
        let end = after
            .find(|c: char| c.is_whitespace() || "=!~<>".contains(c))
            .unwrap_or(after.len());
        mask = Some(parse_u8(&after[..end], "an 8-bit mask")?);
        rest = after[end..].trim_start();
    }

    const OPERATORS: [(&str, Comparison); 7] = [
        ("==", Comparison::Eq),
        ("!=", Comparison::Ne),
        ("~=", Comparison::Ne),
        ("<=", Comparison::Le),
        (">=", Comparison::Ge),
        ("<", Comparison::Lt),
        (">", Comparison::Gt),
    ];
    let (comparison, rest) = OPERATORS
        .iter()
        .find_map(|&(symbol, comparison)| {
            rest.strip_prefix(symbol).map(|rest| (comparison, rest))
        })
        .ok_or_else(malformed)?;

    let value = rest.trim();
    if value.is_empty() {
        return Err(malformed());
    }
    let value = parse_u8(value, "an 8-bit value")?;

    let condition = Condition::new(address, comparison, value);
    Ok(match mask {
        Some(mask) => condition.with_mask(mask),
        None => condition,
    })
}

#[cfg(test)]
mod test {
    use marlua_memory::MemoryMap;

    use super::*;

    fn parse(source: &str) -> Result<Script, ConfigError> {
        Script::parse(source, &RuntimeConfig::default())
    }

    #[test]
    fn test_parse_commands() {
        let script = parse(
            "
            # walk right, then jump over the first goomba
            hold right b 30
            press a
            release RIGHT   -- stop walking
            toggle b
            wait 5
            wait_until [0x001D] == 0
            ",
        )
        .unwrap();
        assert_eq!(
            script.actions(),
            &[
                Action::Hold {
                    buttons: Buttons::RIGHT | Buttons::B,
                    frames: 30,
                },
                Action::Press(Buttons::A),
                Action::Release(Buttons::RIGHT),
                Action::Toggle(Buttons::B),
                Action::Wait(5),
                Action::WaitUntil(Condition::new(Address(0x1D), Comparison::Eq, 0)),
            ]
        );
    }

    #[test]
    fn test_parse_call_syntax() {
        let script =
            parse("hold(\"right\", \"b\", 30)\npress('jump')\nwait(2)\njumps(1, 20)").unwrap();
        assert_eq!(
            script.actions()[0],
            Action::Hold {
                buttons: Buttons::RIGHT | Buttons::B,
                frames: 30,
            }
        );
        assert_eq!(script.actions()[1], Action::Press(Buttons::A));
        assert_eq!(script.actions()[2], Action::Wait(2));
        assert_eq!(script.len(), 6);
    }

    #[test]
    fn test_parse_conditions() {
        let cases = [
            (
                "[$1D] != 0",
                Condition::new(Address(0x1D), Comparison::Ne, 0),
            ),
            (
                "read 0x001D ~= 0",
                Condition::new(Address(0x1D), Comparison::Ne, 0),
            ),
            (
                "[0x0E]&0x0F>=8",
                Condition::new(Address(0x0E), Comparison::Ge, 8).with_mask(0x0F),
            ),
            (
                "read 0x1D==0",
                Condition::new(Address(0x1D), Comparison::Eq, 0),
            ),
            (
                "read $1D&3!=0",
                Condition::new(Address(0x1D), Comparison::Ne, 0).with_mask(3),
            ),
            (
                "[ 29 ] & $80 < 1",
                Condition::new(Address(29), Comparison::Lt, 1).with_mask(0x80),
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_condition(text).unwrap(), expected, "{}", text);
        }

        for text in ["0x1D == 0", "[0x1D] 0", "[0x1D] ==", "[0x1D == 0", "[0x1D] == 256"] {
            assert!(parse_condition(text).is_err(), "{}", text);
        }
    }

    #[test]
    fn test_commands_ignore_case() {
        let script = parse("HOLD a 5
Press B
Wait_Until read(0x1D)==0").unwrap();
        assert_eq!(
            script.actions(),
            &[
                Action::Hold {
                    buttons: Buttons::A,
                    frames: 5,
                },
                Action::Press(Buttons::B),
                Action::WaitUntil(Condition::new(Address(0x1D), Comparison::Eq, 0)),
            ]
        );
    }

    #[test]
    fn test_wait_grounded_uses_config() {
        let config = RuntimeConfig {
            player_state_address: Address(0x0100),
            grounded_value: 3,
            ..RuntimeConfig::default()
        };
        let script = Script::parse("wait_grounded", &config).unwrap();
        assert_eq!(
            script.actions(),
            &[Action::WaitUntil(Condition::new(
                Address(0x0100),
                Comparison::Eq,
                3
            ))]
        );
    }

    #[test]
    fn test_jumps_expansion() {
        let config = RuntimeConfig::default();
        let script = Script::parse("jumps 2 30", &config).unwrap();
        let grounded = Action::WaitUntil(config.grounded_condition());
        let jump = Action::Hold {
            buttons: Buttons::A,
            frames: 30,
        };
        assert_eq!(
            script.actions(),
            &[
                grounded,
                jump,
                Action::Wait(30),
                grounded,
                jump,
                Action::Wait(30)
            ]
        );
    }

    #[test]
    fn test_errors_report_line() {
        let error = parse("press a\n\nhold a turbo 5\n").unwrap_err();
        assert_eq!(error.line(), Some(3));
        assert!(matches!(error.root(), ConfigError::UnknownButton(_)));
        assert_eq!(error.to_string(), "line 3: unknown button: \"turbo\"");
    }

    #[test]
    fn test_malformed_arguments() {
        let root = |source: &str| parse(source).unwrap_err().root().clone();

        assert!(matches!(root("hold a -5"), ConfigError::MalformedInteger { .. }));
        assert!(matches!(root("hold a 1.5"), ConfigError::MalformedInteger { .. }));
        assert!(matches!(root("hold 5"), ConfigError::MissingArgument { .. }));
        assert!(matches!(root("press"), ConfigError::MissingArgument { .. }));
        assert!(matches!(root("wait"), ConfigError::MissingArgument { .. }));
        assert!(matches!(root("wait 1 2"), ConfigError::UnexpectedArgument { .. }));
        assert!(matches!(root("wait_grounded now"), ConfigError::UnexpectedArgument { .. }));
        assert!(matches!(root("jump 2 30"), ConfigError::UnknownCommand(_)));
        assert!(matches!(
            root("wait_until [0x10000] == 0"),
            ConfigError::MalformedInteger { .. }
        ));
        assert!(matches!(
            root("wait_until [0x2002] == 0"),
            ConfigError::AddressOutOfRange { .. }
        ));
    }

    #[test]
    fn test_address_checked_against_map() {
        let config = RuntimeConfig {
            memory_map: MemoryMap::new(Address(0x6000), 0x2000),
            player_state_address: Address(0x6000),
            ..RuntimeConfig::default()
        };
        assert!(Script::parse("wait_until [$7FFF] == 1", &config).is_ok());
        assert!(Script::parse("wait_until [$001D] == 1", &config).is_err());
    }

    #[test]
    fn test_blank_and_comment_only() {
        assert!(parse("\n   \n# nothing\n-- here\n").unwrap().is_empty());
    }
}
