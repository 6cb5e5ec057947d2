//! The V5 register-style instruction set.
//!
//! The top bits of an opcode (and of a sub-opcode selector) tell, per parameter, whether a
//! variable word or an immediate follows: bit 7 for the first parameter, bit 6 for the second
//! and bit 5 for the third. Entries therefore declare the bits that [`OpcodeDef::vary`]
//! between their forms.

use super::*;
use crate::decompiler::{AssignOp, BinOp};

const P8_1: OperandRule = OperandRule::Param { bit: 0x80, width: Width::Byte };
const P8_2: OperandRule = OperandRule::Param { bit: 0x40, width: Width::Byte };
const P8_3: OperandRule = OperandRule::Param { bit: 0x20, width: Width::Byte };
const P16_1: OperandRule = OperandRule::Param { bit: 0x80, width: Width::Word };
const P16_2: OperandRule = OperandRule::Param { bit: 0x40, width: Width::Word };
const P16_3: OperandRule = OperandRule::Param { bit: 0x20, width: Width::Word };
const RESULT: OperandRule = WV;
const ARGS: OperandRule = OperandRule::VarArgs;

const DO: Handler = Handler::InlineCall { result: false };
const GET: Handler = Handler::InlineCall { result: true };

const fn seq(rules: &'static [OperandRule]) -> OperandRule {
    OperandRule::Seq(rules)
}

const fn cmd(opcode: u8, name: &'static str, rule: OperandRule) -> OpcodeDef {
    op(opcode, name, rule, DO)
}

const fn get(opcode: u8, name: &'static str, rule: OperandRule) -> OpcodeDef {
    op(opcode, name, rule, GET)
}

const fn compare(opcode: u8, name: &'static str, op_: BinOp) -> OpcodeDef {
    op(opcode, name, seq(&[WV, P16_1, JMP]), Handler::InlineCompare(op_)).vary(0x80)
}

const fn arith(opcode: u8, name: &'static str, op_: AssignOp) -> OpcodeDef {
    op(opcode, name, seq(&[RESULT, P16_1]), Handler::InlineAssign(op_)).vary(0x80)
}

const ACTOR_OPS: &[OpcodeDef] = &[
    cmd(0x00, "dummy", P8_1),
    cmd(0x01, "costume", P8_1),
    cmd(0x02, "stepDist", seq(&[P8_1, P8_2])),
    cmd(0x03, "sound", P8_1),
    cmd(0x04, "walkAnimation", P8_1),
    cmd(0x05, "talkAnimation", seq(&[P8_1, P8_2])),
    cmd(0x06, "standAnimation", P8_1),
    cmd(0x07, "animation", seq(&[P8_1, P8_2, P8_3])),
    cmd(0x08, "default", NONE),
    cmd(0x09, "elevation", P16_1),
    cmd(0x0A, "animationDefault", NONE),
    cmd(0x0B, "palette", seq(&[P8_1, P8_2])),
    cmd(0x0C, "talkColor", P8_1),
    cmd(0x0D, "name", STR),
    cmd(0x0E, "initAnimation", P8_1),
    cmd(0x10, "width", P8_1),
    cmd(0x11, "scale", seq(&[P8_1, P8_2])),
    cmd(0x12, "neverZClip", NONE),
    cmd(0x13, "setZClip", P8_1),
    cmd(0x14, "ignoreBoxes", NONE),
    cmd(0x15, "followBoxes", NONE),
    cmd(0x16, "animationSpeed", P8_1),
    cmd(0x17, "shadow", P8_1),
];

const PRINT_OPS: &[OpcodeDef] = &[
    cmd(0x00, "pos", seq(&[P16_1, P16_2])),
    cmd(0x01, "color", P8_1),
    cmd(0x02, "clipped", P16_1),
    cmd(0x03, "erase", seq(&[P16_1, P16_2])),
    cmd(0x04, "center", NONE),
    cmd(0x06, "left", NONE),
    cmd(0x07, "overhead", NONE),
    cmd(0x08, "voice", seq(&[P16_1, P16_2])),
    cmd(0x0F, "text", STR).terminal(),
];

const CURSOR_OPS: &[OpcodeDef] = &[
    cmd(0x01, "cursorOn", NONE),
    cmd(0x02, "cursorOff", NONE),
    cmd(0x03, "userputOn", NONE),
    cmd(0x04, "userputOff", NONE),
    cmd(0x05, "softCursorOn", NONE),
    cmd(0x06, "softCursorOff", NONE),
    cmd(0x07, "softUserputOn", NONE),
    cmd(0x08, "softUserputOff", NONE),
    cmd(0x0A, "cursorImage", seq(&[P8_1, P8_2])),
    cmd(0x0B, "cursorHotspot", seq(&[P8_1, P8_2, P8_3])),
    cmd(0x0C, "cursorSet", P8_1),
    cmd(0x0D, "charsetSet", P8_1),
    cmd(0x0E, "charsetColors", ARGS),
];

const RESOURCE_OPS: &[OpcodeDef] = &[
    cmd(0x01, "loadScript", P8_1),
    cmd(0x02, "loadSound", P8_1),
    cmd(0x03, "loadCostume", P8_1),
    cmd(0x04, "loadRoom", P8_1),
    cmd(0x05, "nukeScript", P8_1),
    cmd(0x06, "nukeSound", P8_1),
    cmd(0x07, "nukeCostume", P8_1),
    cmd(0x08, "nukeRoom", P8_1),
    cmd(0x09, "lockScript", P8_1),
    cmd(0x0A, "lockSound", P8_1),
    cmd(0x0B, "lockCostume", P8_1),
    cmd(0x0C, "lockRoom", P8_1),
    cmd(0x0D, "unlockScript", P8_1),
    cmd(0x0E, "unlockSound", P8_1),
    cmd(0x0F, "unlockCostume", P8_1),
    cmd(0x10, "unlockRoom", P8_1),
    cmd(0x11, "clearHeap", NONE),
    cmd(0x12, "loadCharset", P8_1),
    cmd(0x13, "nukeCharset", P8_1),
    cmd(0x14, "loadFlObject", seq(&[P8_1, P16_2])),
];

const ROOM_OPS: &[OpcodeDef] = &[
    cmd(0x01, "roomScroll", seq(&[P16_1, P16_2])),
    cmd(0x03, "setScreen", seq(&[P16_1, P16_2])),
    cmd(0x05, "shakeOn", NONE),
    cmd(0x06, "shakeOff", NONE),
    cmd(0x08, "roomIntensity", seq(&[P8_1, P8_2, P8_3])),
    cmd(0x0A, "screenEffect", P16_1),
];

const VERB_OPS: &[OpcodeDef] = &[
    cmd(0x01, "image", P16_1),
    cmd(0x02, "name", STR),
    cmd(0x03, "color", P8_1),
    cmd(0x04, "hiColor", P8_1),
    cmd(0x05, "setXY", seq(&[P16_1, P16_2])),
    cmd(0x06, "on", NONE),
    cmd(0x07, "off", NONE),
    cmd(0x08, "delete", NONE),
    cmd(0x09, "new", NONE),
    cmd(0x10, "dimColor", P8_1),
    cmd(0x11, "dim", NONE),
    cmd(0x12, "key", P8_1),
    cmd(0x13, "center", NONE),
    cmd(0x14, "nameString", P16_1),
    cmd(0x16, "assignObject", seq(&[P16_1, P8_2])),
    cmd(0x17, "backColor", P8_1),
];

const STRING_OPS: &[OpcodeDef] = &[
    cmd(0x01, "putCodeInString", seq(&[P8_1, STR])),
    cmd(0x02, "copyString", seq(&[P8_1, P8_2])),
    cmd(0x03, "setStringChar", seq(&[P8_1, P8_2, P8_3])),
    get(0x04, "getStringChar", seq(&[RESULT, P8_1, P8_2])),
    cmd(0x05, "createString", seq(&[P8_1, P8_2])),
];

const SAVE_RESTORE_OPS: &[OpcodeDef] = &[
    cmd(0x01, "saveVerbs", seq(&[P8_1, P8_2, P8_3])),
    cmd(0x02, "restoreVerbs", seq(&[P8_1, P8_2, P8_3])),
    cmd(0x03, "deleteVerbs", seq(&[P8_1, P8_2, P8_3])),
];

const DRAW_OBJECT_OPS: &[OpcodeDef] = &[
    cmd(0x01, "setXY", seq(&[P16_1, P16_2])),
    cmd(0x02, "setImage", P16_1),
    cmd(0x1F, "now", NONE),
];

const fn ops(opcode: u8, name: &'static str, rule: OperandRule) -> OpcodeDef {
    op(opcode, name, rule, Handler::Ops)
}

pub(super) static V5: Overlay = Overlay {
    parent: None,
    removed: &[],
    entries: &[
        cmd(0x00, "stopObjectCode", NONE),
        cmd(0x01, "putActor", seq(&[P8_1, P16_2, P16_3])).vary(0xE0),
        cmd(0x02, "startMusic", P8_1).vary(0x80),
        get(0x03, "getActorRoom", seq(&[RESULT, P8_1])).vary(0x80),
        compare(0x04, "isGreaterEqual", BinOp::Le),
        ops(0x05, "drawObject", seq(&[P16_1, OperandRule::Sub { mask: 0x1F, table: DRAW_OBJECT_OPS }])).vary(0x80),
        get(0x06, "getActorElevation", seq(&[RESULT, P8_1])).vary(0x80),
        cmd(0x07, "setState", seq(&[P16_1, P8_2])).vary(0xC0),
        compare(0x08, "isNotEqual", BinOp::Ne),
        cmd(0x09, "faceActor", seq(&[P8_1, P16_2])).vary(0xC0),
        cmd(0x0A, "startScript", seq(&[P8_1, ARGS])).vary(0xE0),
        get(0x0B, "getVerbEntrypoint", seq(&[RESULT, P16_1, P16_2])).vary(0xC0),
        ops(0x0C, "resourceRoutines", OperandRule::Sub { mask: 0x3F, table: RESOURCE_OPS }).vary(0x80),
        cmd(0x0D, "walkActorToActor", seq(&[P8_1, P8_2, B])).vary(0xC0),
        cmd(0x0E, "putActorAtObject", seq(&[P8_1, P16_2])).vary(0xC0),
        get(0x0F, "getObjectState", seq(&[RESULT, P16_1])).vary(0x80),
        get(0x10, "getObjectOwner", seq(&[RESULT, P16_1])).vary(0x80),
        cmd(0x11, "animateActor", seq(&[P8_1, P8_2])).vary(0xC0),
        cmd(0x12, "panCameraTo", P16_1).vary(0x80),
        ops(0x13, "actorOps", seq(&[P8_1, OperandRule::Loop { mask: 0x1F, table: ACTOR_OPS }])).vary(0xC0),
        ops(0x14, "print", seq(&[P8_1, OperandRule::Loop { mask: 0x0F, table: PRINT_OPS }])).vary(0x80),
        get(0x15, "actorFromPos", seq(&[RESULT, P16_1, P16_2])).vary(0xC0),
        get(0x16, "getRandomNr", seq(&[RESULT, P8_1])).vary(0x80),
        arith(0x17, "and", AssignOp::And),
        op(0x18, "jumpRelative", JMP, Handler::Jump),
        arith(0x1A, "move", AssignOp::Set),
        arith(0x1B, "multiply", AssignOp::Mul),
        cmd(0x1C, "startSound", P8_1).vary(0x80),
        op(0x1D, "ifClassOfIs", seq(&[P16_1, ARGS, JMP]), Handler::InlineCondition).vary(0x80),
        cmd(0x1E, "walkActorTo", seq(&[P8_1, P16_2, P16_3])).vary(0xE0),
        op(0x1F, "isActorInBox", seq(&[P8_1, P8_2, JMP]), Handler::InlineCondition).vary(0xC0),
        cmd(0x20, "stopMusic", NONE),
        get(0x22, "getAnimCounter", seq(&[RESULT, P8_1])).vary(0x80),
        get(0x23, "getActorY", seq(&[RESULT, P16_1])).vary(0x80),
        cmd(0x24, "loadRoomWithEgo", seq(&[P16_1, P8_2, W, W])).vary(0xC0),
        cmd(0x25, "pickupObject", seq(&[P16_1, P8_2])).vary(0xC0),
        ops(0x27, "stringOps", OperandRule::Sub { mask: 0x1F, table: STRING_OPS }),
        op(0x28, "equalZero", seq(&[WV, JMP]), Handler::InlineTest { zero: true }),
        cmd(0x29, "setOwnerOf", seq(&[P16_1, P8_2])).vary(0xC0),
        cmd(0x2B, "delayVariable", WV),
        ops(0x2C, "cursorCommand", OperandRule::Sub { mask: 0x1F, table: CURSOR_OPS }),
        cmd(0x2D, "putActorInRoom", seq(&[P8_1, P8_2])).vary(0xC0),
        cmd(0x2E, "delay", OperandRule::Imm(Width::Tri, false)),
        get(0x31, "getInventoryCount", seq(&[RESULT, P8_1])).vary(0x80),
        cmd(0x32, "setCameraAt", P16_1).vary(0x80),
        ops(0x33, "roomOps", OperandRule::Sub { mask: 0x1F, table: ROOM_OPS }).vary(0xC0),
        get(0x34, "getDist", seq(&[RESULT, P16_1, P16_2])).vary(0xC0),
        get(0x35, "findObject", seq(&[RESULT, P8_1, P8_2])).vary(0xC0),
        cmd(0x36, "walkActorToObject", seq(&[P8_1, P16_2])).vary(0xC0),
        cmd(0x37, "startObject", seq(&[P16_1, P8_2, ARGS])).vary(0xC0),
        compare(0x38, "lessOrEqual", BinOp::Ge),
        arith(0x3A, "subtract", AssignOp::Sub),
        get(0x3B, "getActorScale", seq(&[RESULT, P8_1])).vary(0x80),
        cmd(0x3C, "stopSound", P8_1).vary(0x80),
        get(0x3D, "findInventory", seq(&[RESULT, P8_1, P8_2])).vary(0xC0),
        cmd(0x40, "cutscene", ARGS),
        cmd(0x42, "chainScript", seq(&[P8_1, ARGS])).vary(0x80),
        get(0x43, "getActorX", seq(&[RESULT, P16_1])).vary(0x80),
        compare(0x44, "isLess", BinOp::Gt),
        op(0x46, "increment", RESULT, Handler::InlineStep { increment: true }),
        compare(0x48, "isEqual", BinOp::Eq),
        cmd(0x4C, "soundKludge", ARGS),
        cmd(0x52, "actorFollowCamera", P8_1).vary(0x80),
        get(0x56, "getActorMoving", seq(&[RESULT, P8_1])).vary(0x80),
        arith(0x57, "or", AssignOp::Or),
        cmd(0x58, "override", B),
        arith(0x5A, "add", AssignOp::Add),
        arith(0x5B, "divide", AssignOp::Div),
        cmd(0x5D, "setClass", seq(&[P16_1, ARGS])).vary(0x80),
        cmd(0x60, "freezeScripts", P8_1).vary(0x80),
        cmd(0x62, "stopScript", P8_1).vary(0x80),
        get(0x63, "getActorFacing", seq(&[RESULT, P8_1])).vary(0x80),
        get(0x68, "isScriptRunning", seq(&[RESULT, P8_1])).vary(0x80),
        get(0x6C, "getActorWidth", seq(&[RESULT, P8_1])).vary(0x80),
        get(0x71, "getActorCostume", seq(&[RESULT, P8_1])).vary(0x80),
        cmd(0x72, "loadRoom", P8_1).vary(0x80),
        compare(0x78, "isGreater", BinOp::Lt),
        ops(0x7A, "verbOps", seq(&[P8_1, OperandRule::Loop { mask: 0x1F, table: VERB_OPS }])).vary(0x80),
        get(0x7B, "getActorWalkBox", seq(&[RESULT, P8_1])).vary(0x80),
        get(0x7C, "isSoundRunning", seq(&[RESULT, P8_1])).vary(0x80),
        op(0x80, "breakHere", NONE, Handler::Yield),
        cmd(0x98, "systemOps", B),
        cmd(0xA0, "stopObjectCode", NONE),
        op(0xA8, "notEqualZero", seq(&[WV, JMP]), Handler::InlineTest { zero: false }),
        ops(0xAB, "saveRestoreVerbs", OperandRule::Sub { mask: 0x1F, table: SAVE_RESTORE_OPS }),
        cmd(0xC0, "endCutscene", NONE),
        op(0xC6, "decrement", RESULT, Handler::InlineStep { increment: false }),
    ],
};
