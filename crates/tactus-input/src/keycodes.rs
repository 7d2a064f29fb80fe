// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GLFW-compatible key codes for the keys hosts bind most often.

#![allow(missing_docs)]

use crate::key::KeyCode;

pub const UNKNOWN: KeyCode = -1;

pub const SPACE: KeyCode = 32;
pub const APOSTROPHE: KeyCode = 39;
pub const COMMA: KeyCode = 44;
pub const MINUS: KeyCode = 45;
pub const PERIOD: KeyCode = 46;
pub const SLASH: KeyCode = 47;

pub const DIGIT_0: KeyCode = 48;
pub const DIGIT_1: KeyCode = 49;
pub const DIGIT_2: KeyCode = 50;
pub const DIGIT_3: KeyCode = 51;
pub const DIGIT_4: KeyCode = 52;
pub const DIGIT_5: KeyCode = 53;
pub const DIGIT_6: KeyCode = 54;
pub const DIGIT_7: KeyCode = 55;
pub const DIGIT_8: KeyCode = 56;
pub const DIGIT_9: KeyCode = 57;

pub const A: KeyCode = 65;
pub const B: KeyCode = 66;
pub const C: KeyCode = 67;
pub const D: KeyCode = 68;
pub const E: KeyCode = 69;
pub const F: KeyCode = 70;
pub const G: KeyCode = 71;
pub const H: KeyCode = 72;
pub const I: KeyCode = 73;
pub const J: KeyCode = 74;
pub const K: KeyCode = 75;
pub const L: KeyCode = 76;
pub const M: KeyCode = 77;
pub const N: KeyCode = 78;
pub const O: KeyCode = 79;
pub const P: KeyCode = 80;
pub const Q: KeyCode = 81;
pub const R: KeyCode = 82;
pub const S: KeyCode = 83;
pub const T: KeyCode = 84;
pub const U: KeyCode = 85;
pub const V: KeyCode = 86;
pub const W: KeyCode = 87;
pub const X: KeyCode = 88;
pub const Y: KeyCode = 89;
pub const Z: KeyCode = 90;

pub const ESCAPE: KeyCode = 256;
pub const ENTER: KeyCode = 257;
pub const TAB: KeyCode = 258;
pub const BACKSPACE: KeyCode = 259;
pub const INSERT: KeyCode = 260;
pub const DELETE: KeyCode = 261;
pub const RIGHT: KeyCode = 262;
pub const LEFT: KeyCode = 263;
pub const DOWN: KeyCode = 264;
pub const UP: KeyCode = 265;

pub const F1: KeyCode = 290;
pub const F2: KeyCode = 291;
pub const F3: KeyCode = 292;
pub const F4: KeyCode = 293;
pub const F5: KeyCode = 294;
pub const F6: KeyCode = 295;
pub const F7: KeyCode = 296;
pub const F8: KeyCode = 297;
pub const F9: KeyCode = 298;
pub const F10: KeyCode = 299;
pub const F11: KeyCode = 300;
pub const F12: KeyCode = 301;

pub const LEFT_SHIFT: KeyCode = 340;
pub const LEFT_CONTROL: KeyCode = 341;
pub const LEFT_ALT: KeyCode = 342;
pub const LEFT_SUPER: KeyCode = 343;
pub const RIGHT_SHIFT: KeyCode = 344;
pub const RIGHT_CONTROL: KeyCode = 345;
pub const RIGHT_ALT: KeyCode = 346;
pub const RIGHT_SUPER: KeyCode = 347;
