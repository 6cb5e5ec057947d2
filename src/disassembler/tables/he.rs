//! Humongous Entertainment revisions, each an overlay over its predecessor.

use super::*;
use crate::decompiler::BinOp;

const fn ops_code(opcode: u8, name: &'static str, table: &'static [OpcodeDef]) -> OpcodeDef {
    op(opcode, name, OperandRule::Sub { mask: 0xFF, table }, Handler::Ops)
}

const HE60_SOUND_OPS: &[OpcodeDef] = &[
    op(0xDE, "setVolume", NONE, call(&[V])),
    op(0xDF, "setPan", NONE, call(&[V])),
    op(0xE0, "setFrequency", NONE, call(&[V])),
];

const HE60_REDIM_OPS: &[OpcodeDef] = &[
    op(0xC7, "int", WV, call(&[V, V])),
    op(0xCA, "byte", WV, call(&[V, V])),
];

pub(super) static HE60: Overlay = Overlay {
    parent: Some(Version::V6),
    removed: &[0x63, 0x64, 0xAC],
    entries: &[
        op(0xC9, "kernelSetFunctions", NONE, call(&[LIST])),
        op(0xD9, "closeFile", NONE, call(&[V])),
        op(0xDA, "openFile", STR, func(&[V])),
        op(0xDB, "readFile", NONE, func(&[V, V])),
        op(0xDC, "writeFile", NONE, call(&[V, V, V])),
        op(0xDE, "deleteFile", STR, call(&[])),
        op(0xDF, "rename", OperandRule::Seq(&[STR, STR]), call(&[])),
        ops_code(0xE0, "soundOps", HE60_SOUND_OPS),
        op(0xE2, "localizeArrayToScript", NONE, call(&[V])),
        op(0xE9, "seekFilePos", NONE, call(&[V, V, V])),
        ops_code(0xEA, "redimArray", HE60_REDIM_OPS),
        op(0xEB, "readFilePos", NONE, func(&[V])),
        op(0xEC, "copyString", NONE, func(&[V])),
        op(0xED, "getStringWidth", NONE, func(&[V, V, V])),
        op(0xEE, "getStringLen", NONE, func(&[V])),
        op(0xEF, "appendString", NONE, func(&[V, V, V])),
    ],
};

const HE70_SOUND_OPS: &[OpcodeDef] = &[
    op(0x09, "soft", NONE, call(&[])),
    op(0x17, "setVariable", NONE, call(&[V, V, V])),
    op(0x19, "start", NONE, call(&[V, V])),
    op(0x38, "quickStart", NONE, call(&[])),
    op(0xA4, "append", NONE, call(&[])),
    op(0xDE, "dirty", NONE, call(&[])),
    op(0xE0, "frequency", NONE, call(&[V])),
    op(0xE6, "channel", NONE, call(&[V])),
    op(0xE7, "offset", NONE, call(&[V])),
    op(0xE8, "id", NONE, call(&[SOUND])),
    op(0xF5, "loop", NONE, call(&[])),
    op(0xFF, "end", NONE, call(&[])),
];

const HE70_RESOURCE_TYPES: &[OpcodeDef] = &[
    op(0x12, "image", NONE, func(&[V])),
    op(0x13, "room", NONE, func(&[ROOM])),
    op(0x14, "costume", NONE, func(&[COSTUME])),
    op(0x15, "sound", NONE, func(&[SOUND])),
    op(0x16, "script", NONE, func(&[SCRIPT])),
];

const HE70_SYSTEM_MESSAGES: &[OpcodeDef] = &[
    op(0xF0, "message", STR, call(&[])),
    op(0xF1, "versionMessage", STR, call(&[])),
    op(0xF2, "appName", STR, call(&[])),
    op(0xF3, "title", STR, call(&[])),
];

pub(super) static HE70: Overlay = Overlay {
    parent: Some(Version::He60),
    removed: &[],
    entries: &[
        ops_code(0x74, "soundOps", HE70_SOUND_OPS),
        op(0x84, "pickupObject", NONE, call(&[OBJECT, ROOM])),
        ops_code(0xF2, "isResourceLoaded", HE70_RESOURCE_TYPES),
        op(0xF3, "readINI", OperandRule::Seq(&[STR, B]), func(&[])),
        op(0xF9, "createDirectory", STR, call(&[])),
        ops_code(0xFA, "setSystemMessage", HE70_SYSTEM_MESSAGES),
    ],
};

const HE72_DRAW_OBJECT_OPS: &[OpcodeDef] = &[
    op(0x3E, "at", NONE, call(&[OBJECT, V, V, V])),
    op(0x3F, "state", NONE, call(&[OBJECT, V])),
    op(0x40, "stateAt", NONE, call(&[OBJECT, V, V, V])),
];

const HE72_ARRAY_OPS: &[OpcodeDef] = &[
    op(0x07, "assignString", OperandRule::Seq(&[WV, STR]), call(&[])),
    op(0xD0, "assignList", WV, call(&[LIST, V])),
    op(0xD4, "assign2dimList", WV, call(&[V, LIST, V])),
];

const HE72_DIM_OPS: &[OpcodeDef] = &[
    op(0x02, "bit", WV, call(&[V])),
    op(0x03, "nibble", WV, call(&[V])),
    op(0x04, "byte", WV, call(&[V])),
    op(0x05, "int", WV, call(&[V])),
    op(0x06, "dword", WV, call(&[V])),
    op(0x07, "string", WV, call(&[V])),
    op(0xCC, "nuke", WV, call(&[])),
];

const HE72_DIM2_OPS: &[OpcodeDef] = &[
    op(0x02, "bit", WV, call(&[V, V])),
    op(0x03, "nibble", WV, call(&[V, V])),
    op(0x04, "byte", WV, call(&[V, V])),
    op(0x05, "int", WV, call(&[V, V])),
    op(0x06, "dword", WV, call(&[V, V])),
    op(0x07, "string", WV, call(&[V, V])),
];

const HE72_REDIM_OPS: &[OpcodeDef] = &[
    op(0x04, "byte", WV, call(&[V, V])),
    op(0x05, "int", WV, call(&[V, V])),
    op(0x06, "dword", WV, call(&[V, V])),
];

const HE72_RESOURCE_SIZES: &[OpcodeDef] = &[
    op(0x0D, "sound", NONE, func(&[SOUND])),
    op(0x0E, "roomImage", NONE, func(&[ROOM])),
    op(0x0F, "image", NONE, func(&[V])),
    op(0x10, "costume", NONE, func(&[COSTUME])),
    op(0x11, "script", NONE, func(&[SCRIPT])),
];

pub(super) static HE72: Overlay = Overlay {
    parent: Some(Version::He70),
    removed: &[],
    entries: &[
        op(0x02, "pushDWord", D, Handler::PushConst),
        op(0x04, "getScriptString", STR, Handler::PushConst),
        op(0x1B, "isAnyOf2", NONE, func(&[V, LIST])),
        op(0x50, "resetCutscene", NONE, call(&[])),
        op(0x58, "getTimer", B, func(&[V])),
        op(0x59, "setTimer", B, call(&[V])),
        op(0x5A, "getSoundPosition", NONE, func(&[SOUND])),
        op(0x5E, "startScript", B, call(&[SCRIPT, LIST])),
        op(0x60, "startObject", B, call(&[OBJECT, V, LIST])),
        ops_code(0x61, "drawObject", HE72_DRAW_OBJECT_OPS),
        op(0x62, "printWizImage", NONE, call(&[V])),
        op(0x63, "getArrayDimSize", OperandRule::Seq(&[B, WV]), func(&[])),
        op(0x64, "getNumFreeArrays", NONE, func(&[])),
        ops_code(0xA4, "arrayOps", HE72_ARRAY_OPS),
        ops_code(0xBC, "dimArray", HE72_DIM_OPS),
        ops_code(0xC0, "dim2dimArray", HE72_DIM2_OPS),
        op(0xC1, "traceStatus", STR, call(&[V])),
        op(0xCE, "drawWizImage", NONE, call(&[V, V, V, V])),
        op(0xCF, "debugInput", STR, func(&[])),
        op(0xD5, "jumpToScript", B, call(&[SCRIPT, LIST])),
        ops_code(0xEA, "redimArray", HE72_REDIM_OPS),
        ops_code(0xF8, "getResourceSize", HE72_RESOURCE_SIZES),
    ],
};

const HE80_CREATE_SOUND_OPS: &[OpcodeDef] = &[
    op(0x1B, "create", NONE, call(&[SOUND])),
    op(0x80, "reset", NONE, call(&[])),
    op(0xE8, "id", NONE, call(&[SOUND])),
    op(0xFF, "end", NONE, call(&[])),
];

pub(super) static HE80: Overlay = Overlay {
    parent: Some(Version::He72),
    removed: &[],
    entries: &[
        ops_code(0x45, "createSound", HE80_CREATE_SOUND_OPS),
        op(0x46, "getFileSize", STR, func(&[])),
        op(0x48, "stringToInt", NONE, func(&[V])),
        op(0x49, "getSoundVar", NONE, func(&[SOUND, V])),
        op(0x4A, "localizeArrayToRoom", NONE, call(&[V])),
        op(0x4C, "setSoundVar", NONE, call(&[SOUND, V, V])),
        op(0x70, "setState", NONE, call(&[OBJECT, V])),
        op(0xE4, "setBoxSet", NONE, call(&[V])),
    ],
};

const HE90_DISTANCE_OPS: &[OpcodeDef] = &[
    op(0x1C, "between2d", NONE, func(&[V, V, V, V])),
    op(0x1D, "between3d", NONE, func(&[V, V, V, V, V, V])),
];

const HE90_OBJECT_DATA_OPS: &[OpcodeDef] = &[
    op(0x20, "width", NONE, func(&[OBJECT])),
    op(0x21, "height", NONE, func(&[OBJECT])),
    op(0x24, "imageCount", NONE, func(&[OBJECT])),
    op(0x26, "x", NONE, func(&[OBJECT])),
    op(0x27, "y", NONE, func(&[OBJECT])),
];

const HE90_PALETTE_OPS: &[OpcodeDef] = &[
    op(0x39, "select", NONE, call(&[V])),
    op(0x3F, "setColors", NONE, call(&[V, V, V, V])),
    op(0x42, "fromImage", NONE, call(&[V, V])),
    op(0x46, "copy", NONE, call(&[V])),
    op(0xFF, "end", NONE, call(&[])),
];

pub(super) static HE90: Overlay = Overlay {
    parent: Some(Version::He80),
    removed: &[],
    entries: &[
        op(0x0A, "dupN", W, Handler::DupN),
        op(0x1D, "min", NONE, func(&[V, V])),
        op(0x1E, "max", NONE, func(&[V, V])),
        op(0x1F, "sin", NONE, func(&[V])),
        op(0x20, "cos", NONE, func(&[V])),
        op(0x21, "sqrt", NONE, func(&[V])),
        op(0x22, "atan2", NONE, func(&[V, V])),
        op(0x23, "getSegmentAngle", NONE, func(&[V, V, V, V])),
        ops_code(0x24, "getDistanceBetweenPoints", HE90_DISTANCE_OPS),
        op(0x30, "mod", NONE, bin(BinOp::Mod)),
        op(0x31, "shl", NONE, bin(BinOp::Shl)),
        op(0x32, "shr", NONE, bin(BinOp::Shr)),
        op(0x33, "xor", NONE, bin(BinOp::Xor)),
        op(0x34, "findAllObjectsWithClassOf", NONE, func(&[LIST])),
        op(0x36, "cond", NONE, func(&[V, V, V])),
        ops_code(0x44, "getObjectData", HE90_OBJECT_DATA_OPS),
        ops_code(0x9E, "paletteOps", HE90_PALETTE_OPS),
        op(0xAB, "getActorAnimProgress", NONE, func(&[ACTOR])),
    ],
};
