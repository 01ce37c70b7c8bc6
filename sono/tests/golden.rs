//  Library for the Sono programming language.
// Copyright (C) 2018 to 2019 Charles Johnson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

#[macro_use]
extern crate test_sono;
extern crate sono;

use sono::{Context, Options};
use test_sono::BASE_PHONES;

const PALATAL: &str = "[+DOR, +high, -low, +front, -back]";
const PLACE: [&str; 9] = ["LAB", "COR", "DOR", "high", "low", "front", "back", "ant", "dist"];

fn agreeing_place() -> String {
    PLACE
        .iter()
        .map(|feature| format!("@γ|{}", feature))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Each rule in turn with the word it must leave behind.
fn derivation() -> Vec<(String, &'static str)> {
    vec![
        (
            "Af |> [+syl, @α|back] -> [+long] / _ [+syl, @α|back]".to_string(),
            "tɯsihinjaɴzjaɴkiɴeːdɯɴ",
        ),
        (
            format!("S |> [-syl, +cons] -> {} / _ [+syl, +high, +front]", PALATAL),
            "tɯsʲiçinjaɴzjaɴciɴeːdɯɴ",
        ),
        (
            format!("Af |> [-syl, +cons] -> {} / _ [-syl, -cons, +high, +front]", PALATAL),
            "tɯsʲiçinʲaɴzʲaɴciɴeːdɯɴ",
        ),
        (
            "S |> [+syl, +high, +back, -LAB] -> [-voice] / [-voice, -syl] _ [-voice, -syl]".to_string(),
            "tɯ\u{325}sʲiçinʲaɴzʲaɴciɴeːdɯɴ",
        ),
        (
            "S |> [+syl, +long] -> [-long] / _ [-syl, +voice, -cont]".to_string(),
            "tɯ\u{325}sʲiçinʲaɴzʲaɴciɴedɯɴ",
        ),
        (
            "S |> [-syl, -son, -cont, +voice] -> [+cont] / [+syl] _ [+syl]".to_string(),
            "tɯ\u{325}sʲiçinʲaɴzʲaɴciɴezɯɴ",
        ),
        (
            "S |> 'ç' -> 'ɕ' / _ [+syl]".to_string(),
            "tɯ\u{325}sʲiɕinʲaɴzʲaɴciɴezɯɴ",
        ),
        (
            "S |> 'nʲ' -> [-DOR] / _ [+syl]".to_string(),
            "tɯ\u{325}sʲiɕinaɴzʲaɴciɴezɯɴ",
        ),
        (
            format!(
                "S |> 'ɴ' -> [{}] / _ [-syl, +cons, {}]",
                agreeing_place(),
                agreeing_place()
            ),
            "tɯ\u{325}sʲiɕinanʲzʲaɲciɴezɯɴ",
        ),
    ]
}

#[test]
fn each_rule_leaves_the_expected_word() {
    let mut context = Context::from_tsv(BASE_PHONES, Options::default()).unwrap();
    assert_evaluates!(context,
        "w = word \"tɯsihinjaɴzjaɴkiɴeidɯɴ\"" => "tɯsihinjaɴzjaɴkiɴeidɯɴ",
        "len w" => "22",
    );
    for (rule, expected) in derivation() {
        assert_evaluates!(context, &format!("w = w >> ({})", rule) => expected);
    }
}

#[test]
fn the_rules_can_be_applied_together() {
    let mut context = Context::from_tsv(BASE_PHONES, Options::default()).unwrap();
    let rules: Vec<String> = derivation().into_iter().map(|(rule, _)| format!("({})", rule)).collect();
    context.execute(&format!("rules = ({})", rules.join(", ")));
    assert_evaluates!(context,
        "len rules" => "9",
        "`tɯsihinjaɴzjaɴkiɴeidɯɴ` >> rules" => "tɯ\u{325}sʲiɕinanʲzʲaɲciɴezɯɴ",
    );
}
